use serde::{Deserialize, Serialize};

use crate::media::data_url;
use crate::session::{ContentPart, ImageDetail, Message};

pub(crate) const IMAGE_COUNT: u32 = 1;
pub(crate) const IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub(crate) model: String,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u32,
    pub(crate) messages: Vec<MessageParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum MessageParam {
    System { content: String },
    User { content: Vec<ContentBlock> },
    Assistant { content: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: ImageDetail,
}

impl From<&ContentPart> for ContentBlock {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => ContentBlock::Text { text: text.clone() },
            ContentPart::Image {
                mime_type,
                base64_payload,
                detail,
            } => ContentBlock::ImageUrl {
                image_url: ImageUrl {
                    url: data_url(mime_type, base64_payload),
                    detail: *detail,
                },
            },
        }
    }
}

impl From<&Message> for MessageParam {
    fn from(message: &Message) -> Self {
        match message {
            Message::User { parts } => MessageParam::User {
                content: parts.iter().map(ContentBlock::from).collect(),
            },
            // Generated images go back to the model as their URL.
            Message::Assistant { value, .. } => MessageParam::Assistant {
                content: value.clone(),
            },
        }
    }
}

/// Builds the message list for a chat call. An empty system prompt is left
/// out entirely.
pub(crate) fn outbound_messages(system_prompt: &str, turns: &[Message]) -> Vec<MessageParam> {
    let system = (!system_prompt.is_empty()).then(|| MessageParam::System {
        content: system_prompt.to_string(),
    });
    system
        .into_iter()
        .chain(turns.iter().map(MessageParam::from))
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub(crate) choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub(crate) message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

impl ChatCompletionResponse {
    pub(crate) fn into_reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest {
    pub(crate) model: String,
    pub(crate) prompt: String,
    pub(crate) n: u32,
    pub(crate) size: &'static str,
}

impl ImageGenerationRequest {
    pub(crate) fn new(model: String, prompt: String) -> Self {
        Self {
            model,
            prompt,
            n: IMAGE_COUNT,
            size: IMAGE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageGenerationResponse {
    #[serde(default)]
    pub(crate) data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedImage {
    #[serde(default)]
    pub(crate) url: Option<String>,
}

impl ImageGenerationResponse {
    pub(crate) fn into_url(self) -> Option<String> {
        self.data.into_iter().find_map(|image| image.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_message_serializes_as_content_parts() {
        let message = Message::User {
            parts: vec![
                ContentPart::Text("what is this?".to_string()),
                ContentPart::Image {
                    mime_type: "image/jpeg",
                    base64_payload: "AAAA".to_string(),
                    detail: ImageDetail::High,
                },
            ],
        };
        let value = serde_json::to_value(MessageParam::from(&message)).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "what is this?"},
                    {"type": "image_url", "image_url": {
                        "url": "data:image/jpeg;base64,AAAA",
                        "detail": "high"
                    }}
                ]
            })
        );
    }

    #[test]
    fn png_upload_keeps_its_own_mime_type_on_the_wire() {
        let upload = crate::media::ImageUpload::new("chart.PNG", vec![0x89, b'P', b'N']);
        let message = Message::User {
            parts: vec![crate::media::to_content_part(&upload, ImageDetail::Low)],
        };
        let value = serde_json::to_value(MessageParam::from(&message)).unwrap();
        assert_eq!(
            value["content"][0]["image_url"],
            json!({"url": "data:image/png;base64,iVBO", "detail": "low"})
        );
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let turns = vec![Message::User {
            parts: vec![ContentPart::Text("hi".to_string())],
        }];
        let messages = outbound_messages("", &turns);
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], MessageParam::User { .. }));

        let messages = outbound_messages("be brief", &turns);
        assert_eq!(
            messages[0],
            MessageParam::System {
                content: "be brief".to_string()
            }
        );
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn generated_image_replays_as_assistant_text() {
        let value =
            serde_json::to_value(MessageParam::from(&Message::generated_image("https://x/y.png")))
                .unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "https://x/y.png"}));
    }

    #[test]
    fn image_request_uses_fixed_count_and_size() {
        let request = ImageGenerationRequest::new("dall-e-3".to_string(), "a fox".to_string());
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"model": "dall-e-3", "prompt": "a fox", "n": 1, "size": "1024x1024"})
        );
    }

    #[test]
    fn responses_without_results_yield_none() {
        let chat: ChatCompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(chat.into_reply().is_none());
        let image: ImageGenerationResponse = serde_json::from_value(json!({})).unwrap();
        assert!(image.into_url().is_none());
    }
}
