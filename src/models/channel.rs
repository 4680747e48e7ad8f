//! Charm release channels: `<track>/<risk>[/<branch>]`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ProvisionError;

/// Risk level of a release stream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Risk {
    Stable,
    Candidate,
    Beta,
    Edge,
}

/// A parsed release channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    pub track: String,
    pub risk: Risk,
    pub branch: Option<String>,
}

impl Channel {
    pub fn parse(raw: &str) -> Result<Self, ProvisionError> {
        let malformed = |reason: &str| ProvisionError::MalformedChannel {
            channel: raw.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = raw.split('/');
        let track = parts.next().unwrap_or_default();
        let risk = parts
            .next()
            .ok_or_else(|| malformed("expected <track>/<risk>"))?;
        let branch = parts.next();
        if parts.next().is_some() {
            return Err(malformed("too many '/' separators"));
        }

        if track.trim().is_empty() {
            return Err(malformed("empty track"));
        }
        let risk = Risk::from_str(risk).map_err(|_| malformed("unknown risk"))?;
        let branch = match branch {
            Some("") => return Err(malformed("empty branch")),
            Some(b) => Some(b.to_string()),
            None => None,
        };

        Ok(Self {
            track: track.to_string(),
            risk,
            branch,
        })
    }
}

impl FromStr for Channel {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::parse(s)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.track, self.risk)?;
        if let Some(branch) = &self.branch {
            write!(f, "/{}", branch)?;
        }
        Ok(())
    }
}
