//! Presentation rows and form labels for the settings page.

use secrecy::ExposeSecret;
use serde::Serialize;

use crate::connections::{ConnectionProfile, ProbeReport, ProfileId};

/// Labels and help text for the connection form.
pub mod labels {
    pub const HEADING: &str = "GitHub Servers";
    pub const ADD_BUTTON: &str = "Add GitHub server";
    pub const SERVER_NAME: &str = "GitHub URL";
    pub const SERVER_DESC: &str =
        "The base GitHub or GitHub Enterprise URL, e.g. github.com or github.acme.com";
    pub const TOKEN_NAME: &str = "GitHub Personal Access Token";
    pub const TOKEN_DESC: &str = "It's a secret";
    pub const TOKEN_PLACEHOLDER: &str = "Enter your secret";
    pub const TEST_BUTTON: &str = "Test Connection";
}

const MASK: &str = "••••••••";

/// Tokens at or below this length are fully masked.
const MIN_HINT_LEN: usize = 8;

/// One rendered profile row. The credential is never included in cleartext.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: ProfileId,
    pub endpoint: String,
    pub credential_set: bool,
    pub credential_hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_probe: Option<ProbeReport>,
}

impl ProfileView {
    pub fn new(profile: &ConnectionProfile, last_probe: Option<ProbeReport>) -> Self {
        Self {
            id: profile.id,
            endpoint: profile.endpoint.clone(),
            credential_set: profile.has_credential(),
            credential_hint: mask_credential(profile.credential.expose_secret()),
            last_probe,
        }
    }
}

/// Static description of the form, for clients that render it themselves.
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub heading: &'static str,
    pub add_button: &'static str,
    pub fields: [FormField; 2],
    pub test_button: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    pub secret: bool,
}

impl FormSchema {
    pub fn connections() -> Self {
        Self {
            heading: labels::HEADING,
            add_button: labels::ADD_BUTTON,
            fields: [
                FormField {
                    key: "endpoint",
                    name: labels::SERVER_NAME,
                    description: labels::SERVER_DESC,
                    placeholder: None,
                    secret: false,
                },
                FormField {
                    key: "credential",
                    name: labels::TOKEN_NAME,
                    description: labels::TOKEN_DESC,
                    placeholder: Some(labels::TOKEN_PLACEHOLDER),
                    secret: true,
                },
            ],
            test_button: labels::TEST_BUTTON,
        }
    }
}

/// Mask a token for display: empty stays empty, long tokens keep their last
/// four characters, short ones are fully hidden.
pub fn mask_credential(secret: &str) -> String {
    let len = secret.chars().count();
    if len == 0 {
        return String::new();
    }
    if len <= MIN_HINT_LEN {
        return MASK.to_string();
    }
    let tail: String = secret.chars().skip(len - 4).collect();
    format!("{MASK}{tail}")
}

/// First eight characters of an id, as shown in the console listing.
pub fn short_id(id: ProfileId) -> String {
    id.to_string().chars().take(8).collect()
}
