//! The session controller: owns the [`Session`] and mediates every change to it.

use crate::ai_sdk::{outbound_messages, ChatCompletionRequest, ImageGenerationRequest};
use crate::catalog::ModelCatalogs;
use crate::client::{is_valid_base_url, Credentials, Gateway};
use crate::error::ChatError;
use crate::media::{self, ImageUpload};
use crate::session::{
    CatalogKind, ContentPart, Message, Mode, ParameterUpdate, Parameters, Session,
};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-vision-preview";
pub const INPUT_COUNTER_STEP: u64 = 1;

type Observer = Box<dyn Fn(&Session) + Send + Sync>;

pub struct SessionController<G> {
    gateway: G,
    session: Session,
    credentials: Credentials,
    default_chat_model: String,
    observers: Vec<Observer>,
}

impl<G: Gateway> SessionController<G> {
    pub fn new(gateway: G, session: Session) -> Self {
        Self {
            gateway,
            session,
            credentials: Credentials::default(),
            default_chat_model: DEFAULT_CHAT_MODEL.to_string(),
            observers: Vec::new(),
        }
    }

    /// Model used in text/vision mode when nothing has been selected.
    pub fn with_default_chat_model(mut self, model: impl Into<String>) -> Self {
        self.default_chat_model = model.into();
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Registers a callback that receives the session after every change.
    pub fn subscribe(&mut self, observer: impl Fn(&Session) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer(&self.session);
        }
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    /// Fetches the provider's models and replaces both catalogs.
    ///
    /// Selections are left alone even if they no longer appear in a catalog.
    pub async fn fetch_models(
        &mut self,
        base_url: &str,
        api_key: &str,
    ) -> Result<ModelCatalogs, ChatError> {
        if base_url.is_empty() || api_key.is_empty() {
            return Err(ChatError::Credentials);
        }
        if !is_valid_base_url(base_url) {
            return Err(ChatError::Validation);
        }

        let credentials = Credentials::new(base_url, api_key);
        let catalogs = match self.gateway.list_models(&credentials).await {
            Ok(catalogs) => catalogs,
            Err(err) => {
                tracing::warn!(error = %err, "model listing failed");
                return Err(err);
            }
        };
        tracing::info!(
            text_vision = catalogs.text_vision.len(),
            image_gen = catalogs.image_gen.len(),
            "model catalogs updated"
        );

        self.session.catalogs = catalogs.clone();
        self.notify();
        Ok(catalogs)
    }

    pub fn set_system_prompt(&mut self, text: impl Into<String>) {
        self.session.system_prompt = text.into();
        self.notify();
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.session.mode = mode;
        self.notify();
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.session.mode.toggled());
    }

    pub fn select_model(&mut self, catalog: CatalogKind, id: impl Into<String>) {
        let id = id.into();
        tracing::info!(?catalog, model = %id, "model selected");
        match catalog {
            CatalogKind::TextVision => self.session.selected_text_vision_model = Some(id),
            CatalogKind::ImageGen => self.session.selected_image_gen_model = Some(id),
        }
        self.notify();
    }

    pub fn set_parameters(&mut self, update: ParameterUpdate) -> Parameters {
        self.session.parameters.apply(update);
        self.notify();
        self.session.parameters
    }

    /// Sends one user turn and appends the reply.
    ///
    /// Preconditions are checked in order and leave the session untouched.
    /// Once they pass, the user message is committed and stays in history
    /// even if the gateway call fails.
    pub async fn send(
        &mut self,
        text_input: Option<&str>,
        images: &[ImageUpload],
    ) -> Result<(), ChatError> {
        let text_input = text_input.filter(|text| !text.is_empty());
        if text_input.is_none() && images.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if !self.credentials.is_complete() {
            return Err(ChatError::Credentials);
        }
        if !is_valid_base_url(&self.credentials.base_url) {
            return Err(ChatError::Validation);
        }
        media::validate_all(images)?;
        let image_model = match self.session.mode {
            Mode::ImageGen => Some(
                self.session
                    .selected_image_gen_model
                    .clone()
                    .ok_or(ChatError::ModelUnset)?,
            ),
            Mode::TextVision => None,
        };

        let detail = self.session.parameters.image_detail;
        let parts = text_input
            .map(|text| ContentPart::Text(text.to_string()))
            .into_iter()
            .chain(images.iter().map(|image| media::to_content_part(image, detail)))
            .collect();
        self.session.turns.push(Message::User { parts });
        self.notify();

        let reply = match image_model {
            Some(model) => {
                let prompt = text_input.unwrap_or_default().to_string();
                tracing::info!(%model, "sending image generation turn");
                self.gateway
                    .generate_image(
                        &self.credentials,
                        ImageGenerationRequest::new(model, prompt),
                    )
                    .await
                    .map(Message::generated_image)
            }
            None => {
                let request = self.chat_request();
                tracing::info!(
                    model = %request.model,
                    images = images.len(),
                    "sending chat turn"
                );
                self.gateway
                    .chat_completion(&self.credentials, request)
                    .await
                    .map(Message::assistant_text)
            }
        };

        match reply {
            Ok(message) => {
                self.session.turns.push(message);
                self.session.input_counter += INPUT_COUNTER_STEP;
                self.notify();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "turn failed; user message kept");
                Err(err)
            }
        }
    }

    fn chat_request(&self) -> ChatCompletionRequest {
        let model = self
            .session
            .selected_text_vision_model
            .clone()
            .unwrap_or_else(|| self.default_chat_model.clone());
        ChatCompletionRequest {
            model,
            temperature: self.session.parameters.temperature,
            max_tokens: self.session.parameters.max_tokens,
            messages: outbound_messages(&self.session.system_prompt, &self.session.turns),
        }
    }

    /// Drops every turn, keeping the system prompt, selections and parameters.
    pub fn clear(&mut self) {
        let dropped = self.session.history_len() - 1;
        self.session.turns.clear();
        tracing::info!(dropped, "conversation cleared");
        self.notify();
    }
}
