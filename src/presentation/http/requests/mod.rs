use poem_openapi::Object;

use crate::presentation::models::PriorityKind;

/// Exactly one of `text`, `template` or `image` must be set.
#[derive(Object, Debug)]
pub struct SendMessageRequestDto {
    #[oai(validator(min_length = 1))]
    pub recipient: String,
    pub text: Option<String>,
    pub template: Option<TemplatePayloadDto>,
    pub image: Option<ImagePayloadDto>,
    #[oai(default)]
    pub priority: PriorityKind,
    pub preferred_channel: Option<String>,
}

#[derive(Object, Debug)]
pub struct TemplatePayloadDto {
    #[oai(validator(min_length = 1))]
    pub name: String,
    #[oai(default = "default_language")]
    pub language: String,
    #[oai(default)]
    pub parameters: Vec<String>,
}

#[derive(Object, Debug)]
pub struct ImagePayloadDto {
    #[oai(validator(min_length = 1))]
    pub url: String,
    pub caption: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}
