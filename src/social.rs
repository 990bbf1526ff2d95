//! Social link used for the optional QR code.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Instagram,
    Facebook,
    Vk,
    Email,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Vk,
        Platform::Email,
    ];

    pub fn base_url(&self) -> &'static str {
        match self {
            Platform::Instagram => "https://www.instagram.com/",
            Platform::Facebook => "https://www.facebook.com/",
            Platform::Vk => "https://vk.com/",
            Platform::Email => "mailto:",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Vk => "vk",
            Platform::Email => "email",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::ValidationError(format!("unknown social platform: {}", wanted)))
    }
}

/// Platform and handle; the URL is derived on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialLink {
    platform: Option<Platform>,
    handle: String,
}

impl SocialLink {
    pub fn new(platform: Platform, handle: impl Into<String>) -> Self {
        Self {
            platform: Some(platform),
            handle: handle.into(),
        }
    }

    pub fn set_platform(&mut self, platform: Option<Platform>) {
        self.platform = platform;
    }

    pub fn set_handle(&mut self, handle: impl Into<String>) {
        self.handle = handle.into();
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    /// Link target, or an empty string unless both platform and a
    /// non-blank handle are set.
    pub fn url(&self) -> String {
        match self.platform {
            Some(platform) if !self.handle.trim().is_empty() => {
                format!("{}{}", platform.base_url(), self.handle.trim())
            }
            _ => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url().is_empty()
    }
}
