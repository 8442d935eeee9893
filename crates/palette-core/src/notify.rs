//! Text-message notifications through a Twilio-compatible messaging API.

use crate::config::NotifyConfig;
use crate::env::{self, Env};
use crate::error::{PaletteError, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub sid: String,
}

pub trait Notifier {
    /// Send `message` once. No retry; failures are returned as-is.
    fn notify(&self, message: &str) -> Result<MessageReceipt>;
}

pub struct TwilioNotifier {
    http: Client,
    url: String,
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
}

impl TwilioNotifier {
    /// Resolve credentials and both phone numbers; any missing value is an
    /// error here, before a send is attempted.
    pub fn from_config(config: &NotifyConfig, env: &Env) -> Result<Self> {
        let to = env.get(env::TWILIO_TO_NUMBER);
        let from = env.get(env::TWILIO_FROM_NUMBER);
        let (Some(to), Some(from)) = (to, from) else {
            return Err(PaletteError::MissingConfig(
                "no phone number(s) found: set TWILIO_TO_NUMBER and TWILIO_FROM_NUMBER"
                    .to_string(),
            ));
        };
        let account_sid = env.require(env::TWILIO_ACCOUNT_SID)?.to_string();
        let auth_token = env.require(env::TWILIO_AUTH_TOKEN)?.to_string();

        let url = format!(
            "{}/2010-04-01/Accounts/{account_sid}/Messages.json",
            config.api_base.trim_end_matches('/')
        );

        Ok(Self {
            http: Client::new(),
            url,
            account_sid,
            auth_token,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

impl Notifier for TwilioNotifier {
    fn notify(&self, message: &str) -> Result<MessageReceipt> {
        tracing::info!("sending a text");

        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", self.to.as_str()), ("From", self.from.as_str()), ("Body", message)])
            .send()
            .map_err(|e| PaletteError::Notify(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            #[derive(Deserialize)]
            struct ApiError {
                message: String,
            }
            let text = response.text().unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or_default().to_string());
            return Err(PaletteError::Notify(format!("{}: {detail}", status.as_u16())));
        }

        let receipt: MessageReceipt = response
            .json()
            .map_err(|e| PaletteError::Notify(e.to_string()))?;
        tracing::info!(sid = %receipt.sid, "text sent successfully");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const MESSAGES_PATH: &str = "/2010-04-01/Accounts/AC123/Messages.json";

    fn env() -> Env {
        Env::from_pairs([
            (env::TWILIO_ACCOUNT_SID, "AC123"),
            (env::TWILIO_AUTH_TOKEN, "secret"),
            (env::TWILIO_TO_NUMBER, "+15550001111"),
            (env::TWILIO_FROM_NUMBER, "+15550002222"),
        ])
    }

    fn config(api_base: String) -> NotifyConfig {
        NotifyConfig {
            api_base,
            ..NotifyConfig::default()
        }
    }

    #[test]
    fn sends_form_with_basic_auth() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", MESSAGES_PATH)
            // base64("AC123:secret")
            .match_header("authorization", "Basic QUMxMjM6c2VjcmV0")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("To".into(), "+15550001111".into()),
                Matcher::UrlEncoded("From".into(), "+15550002222".into()),
                Matcher::UrlEncoded("Body".into(), "Palette refresh successful".into()),
            ]))
            .with_status(201)
            .with_body(r#"{"sid":"SM1","status":"queued"}"#)
            .create();

        let notifier = TwilioNotifier::from_config(&config(server.url()), &env()).unwrap();
        let receipt = notifier.notify("Palette refresh successful").unwrap();

        mock.assert();
        assert_eq!(receipt.sid, "SM1");
    }

    #[test]
    fn api_error_is_surfaced() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", MESSAGES_PATH)
            .with_status(400)
            .with_body(r#"{"code":21211,"message":"Invalid 'To' Phone Number"}"#)
            .create();

        let notifier = TwilioNotifier::from_config(&config(server.url()), &env()).unwrap();
        let err = notifier.notify("hi").unwrap_err();
        assert_eq!(
            err.to_string(),
            "notification failed: 400: Invalid 'To' Phone Number"
        );
    }

    #[test]
    fn missing_numbers_fail_before_send() {
        let env = Env::from_pairs([
            (env::TWILIO_ACCOUNT_SID, "AC123"),
            (env::TWILIO_AUTH_TOKEN, "secret"),
            (env::TWILIO_TO_NUMBER, "+15550001111"),
        ]);
        let err = TwilioNotifier::from_config(&NotifyConfig::default(), &env)
            .err()
            .unwrap();
        assert!(err.to_string().contains("no phone number(s) found"));
    }

    #[test]
    fn missing_account_sid_is_named() {
        let env = Env::from_pairs([
            (env::TWILIO_TO_NUMBER, "+15550001111"),
            (env::TWILIO_FROM_NUMBER, "+15550002222"),
        ]);
        let err = TwilioNotifier::from_config(&NotifyConfig::default(), &env)
            .err()
            .unwrap();
        assert!(matches!(err, PaletteError::MissingConfig(ref k) if k == env::TWILIO_ACCOUNT_SID));
    }
}
