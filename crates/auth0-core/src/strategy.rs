//! Connection strategies and the option shapes they select

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Auth0Error;

/// Macro to generate the strategy enum together with its wire identifiers
macro_rules! define_strategies {
    ($($variant:ident => $id:literal),+ $(,)?) => {
        /// Identity-provider integration used by a connection
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Strategy {
            $($variant),+
        }

        impl Strategy {
            /// Every strategy the provider can manage
            pub const ALL: &'static [Strategy] = &[$(Strategy::$variant),+];

            /// Identifier used by the Management API
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Strategy::$variant => $id),+
                }
            }
        }

        impl FromStr for Strategy {
            type Err = Auth0Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok(Strategy::$variant),)+
                    other => Err(Auth0Error::unsupported_strategy(other)),
                }
            }
        }
    };
}

define_strategies! {
    Auth0 => "auth0",
    GoogleOAuth2 => "google-oauth2",
    GoogleApps => "google-apps",
    OAuth2 => "oauth2",
    Dropbox => "dropbox",
    Bitbucket => "bitbucket",
    Paypal => "paypal",
    PaypalSandbox => "paypal-sandbox",
    Twitter => "twitter",
    Amazon => "amazon",
    Yahoo => "yahoo",
    Box => "box",
    Wordpress => "wordpress",
    Discord => "discord",
    Imgur => "imgur",
    Spotify => "spotify",
    Shopify => "shopify",
    Figma => "figma",
    SlackOAuth2 => "slack-oauth-2",
    DigitalOcean => "digitalocean",
    Twitch => "twitch",
    Vimeo => "vimeo",
    Custom => "custom",
    Facebook => "facebook",
    Apple => "apple",
    LinkedIn => "linkedin",
    GitHub => "github",
    WindowsLive => "windowslive",
    Salesforce => "salesforce",
    SalesforceCommunity => "salesforce-community",
    SalesforceSandbox => "salesforce-sandbox",
    Sms => "sms",
    Email => "email",
    Oidc => "oidc",
    Okta => "okta",
    Ad => "ad",
    AzureAd => "waad",
    Adfs => "adfs",
    Saml => "samlp",
    PingFederate => "pingfederate",
}

/// Shape of the strategy-specific options object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionsKind {
    Database,
    GoogleOAuth2,
    GoogleApps,
    OAuth2,
    Facebook,
    Apple,
    LinkedIn,
    GitHub,
    WindowsLive,
    Salesforce,
    Sms,
    Email,
    Oidc,
    Okta,
    Ad,
    AzureAd,
    Adfs,
    Saml,
    PingFederate,
}

impl Strategy {
    /// Options shape selected by this strategy.
    pub fn options_kind(&self) -> OptionsKind {
        match self {
            Self::Auth0 => OptionsKind::Database,
            Self::GoogleOAuth2 => OptionsKind::GoogleOAuth2,
            Self::GoogleApps => OptionsKind::GoogleApps,
            Self::OAuth2
            | Self::Dropbox
            | Self::Bitbucket
            | Self::Paypal
            | Self::PaypalSandbox
            | Self::Twitter
            | Self::Amazon
            | Self::Yahoo
            | Self::Box
            | Self::Wordpress
            | Self::Discord
            | Self::Imgur
            | Self::Spotify
            | Self::Shopify
            | Self::Figma
            | Self::SlackOAuth2
            | Self::DigitalOcean
            | Self::Twitch
            | Self::Vimeo
            | Self::Custom => OptionsKind::OAuth2,
            Self::Facebook => OptionsKind::Facebook,
            Self::Apple => OptionsKind::Apple,
            Self::LinkedIn => OptionsKind::LinkedIn,
            Self::GitHub => OptionsKind::GitHub,
            Self::WindowsLive => OptionsKind::WindowsLive,
            Self::Salesforce | Self::SalesforceCommunity | Self::SalesforceSandbox => {
                OptionsKind::Salesforce
            }
            Self::Sms => OptionsKind::Sms,
            Self::Email => OptionsKind::Email,
            Self::Oidc => OptionsKind::Oidc,
            Self::Okta => OptionsKind::Okta,
            Self::Ad => OptionsKind::Ad,
            Self::AzureAd => OptionsKind::AzureAd,
            Self::Adfs => OptionsKind::Adfs,
            Self::Saml => OptionsKind::Saml,
            Self::PingFederate => OptionsKind::PingFederate,
        }
    }

    /// Enterprise federation strategies carry `show_as_button` on the connection.
    pub fn shows_button(&self) -> bool {
        matches!(
            self,
            Self::GoogleApps
                | Self::Oidc
                | Self::Okta
                | Self::Ad
                | Self::AzureAd
                | Self::Saml
                | Self::Adfs
                | Self::PingFederate
        )
    }

    /// Strategies whose empty `set_user_root_attributes` surfaces as `on_each_login`.
    pub fn defaults_user_root_attributes(&self) -> bool {
        matches!(
            self,
            Self::GoogleApps
                | Self::Ad
                | Self::AzureAd
                | Self::Adfs
                | Self::Saml
                | Self::PingFederate
        )
    }

    /// Passwordless strategies
    pub fn is_passwordless(&self) -> bool {
        matches!(self, Self::Sms | Self::Email)
    }

    /// Identifiers of every known strategy, for schema validation
    pub fn identifiers() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Strategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
