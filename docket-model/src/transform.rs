use std::fmt;
use std::str::FromStr;

/// A named normalization applied to text field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Lowercase,
    Uppercase,
    Trim,
    TrimStart,
    TrimEnd,
}

impl Transform {
    /// Applies the transform to `input`.
    pub fn apply(self, input: &str) -> String {
        match self {
            Transform::Lowercase => input.to_lowercase(),
            Transform::Uppercase => input.to_uppercase(),
            Transform::Trim => input.trim().to_string(),
            Transform::TrimStart => input.trim_start().to_string(),
            Transform::TrimEnd => input.trim_end().to_string(),
        }
    }

    /// Canonical name as written in field specs.
    pub const fn name(self) -> &'static str {
        match self {
            Transform::Lowercase => "toLowerCase",
            Transform::Uppercase => "toUpperCase",
            Transform::Trim => "trim",
            Transform::TrimStart => "trimStart",
            Transform::TrimEnd => "trimEnd",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a transform name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transform: {0}")]
pub struct UnknownTransform(pub String);

impl FromStr for Transform {
    type Err = UnknownTransform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toLowerCase" | "lowercase" => Ok(Transform::Lowercase),
            "toUpperCase" | "uppercase" => Ok(Transform::Uppercase),
            "trim" => Ok(Transform::Trim),
            "trimStart" | "trimLeft" => Ok(Transform::TrimStart),
            "trimEnd" | "trimRight" => Ok(Transform::TrimEnd),
            other => Err(UnknownTransform(other.to_string())),
        }
    }
}
