//! Text form of the single mutation the remote session accepts.

use std::fmt;

use thiserror::Error;

use crate::CellPos;

/// One cell mutation, rendered as `/<name> <x> <y> <z> <identifier> <variant>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SetblockCommand {
    name: String,
    pos: CellPos,
    identifier: String,
    variant: u8,
}

impl SetblockCommand {
    /// Creates a new command.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        pos: CellPos,
        identifier: impl Into<String>,
        variant: u8,
    ) -> Self {
        Self {
            name: name.into(),
            pos,
            identifier: identifier.into(),
            variant,
        }
    }

    /// Parses a command line previously produced by the [`fmt::Display`] impl.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let body = line
            .trim()
            .strip_prefix('/')
            .ok_or(CommandParseError::MissingSlash)?;

        let mut fields = body.split_whitespace();
        let name = fields.next().ok_or(CommandParseError::MissingField("name"))?;
        let x = parse_coordinate(fields.next(), "x")?;
        let y = parse_coordinate(fields.next(), "y")?;
        let z = parse_coordinate(fields.next(), "z")?;
        let identifier = fields
            .next()
            .ok_or(CommandParseError::MissingField("identifier"))?;
        let variant = fields
            .next()
            .ok_or(CommandParseError::MissingField("variant"))?;
        let variant = variant
            .parse::<u8>()
            .map_err(|_| CommandParseError::InvalidVariant(variant.to_owned()))?;

        if let Some(extra) = fields.next() {
            return Err(CommandParseError::TrailingInput(extra.to_owned()));
        }

        Ok(Self::new(name, CellPos::new(x, y, z), identifier, variant))
    }

    /// Command name without the leading slash.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target cell of the mutation.
    #[must_use]
    pub const fn pos(&self) -> CellPos {
        self.pos
    }

    /// Block identifier written into the cell.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Variant index written into the cell.
    #[must_use]
    pub const fn variant(&self) -> u8 {
        self.variant
    }
}

impl fmt::Display for SetblockCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{} {} {} {} {} {}",
            self.name,
            self.pos.x(),
            self.pos.y(),
            self.pos.z(),
            self.identifier,
            self.variant
        )
    }
}

fn parse_coordinate(field: Option<&str>, axis: &'static str) -> Result<i32, CommandParseError> {
    let field = field.ok_or(CommandParseError::MissingField(axis))?;
    field
        .parse::<i32>()
        .map_err(|_| CommandParseError::InvalidCoordinate {
            axis,
            value: field.to_owned(),
        })
}

/// Reasons a command line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandParseError {
    /// Commands always begin with a slash.
    #[error("command does not start with '/'")]
    MissingSlash,
    /// A required field was absent.
    #[error("command is missing the {0} field")]
    MissingField(&'static str),
    /// A coordinate was not an integer.
    #[error("invalid {axis} coordinate '{value}'")]
    InvalidCoordinate {
        /// Axis the coordinate belongs to.
        axis: &'static str,
        /// Raw text of the field.
        value: String,
    },
    /// The variant index was not a small unsigned integer.
    #[error("invalid variant index '{0}'")]
    InvalidVariant(String),
    /// Unexpected text followed the variant index.
    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),
}
