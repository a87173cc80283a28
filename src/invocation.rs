//! Command-line handling.
//!
//! The only argument the bot ever takes is the descriptor number it passes
//! to itself on hot reload. Everything else comes from the config file.

use crate::error::StartupError;
use crate::network::ResumeToken;

/// How this process image was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// No arguments: connect and register from scratch.
    Cold,
    /// One descriptor number: reattach to a connection left by the previous image.
    Warm(ResumeToken),
}

impl Invocation {
    /// Interpret the arguments after the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        match args.as_slice() {
            [] => Ok(Self::Cold),
            [token] => token.as_ref().parse().map(Self::Warm),
            _ => Err(StartupError::TooManyArguments(args.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_cold() {
        assert_eq!(
            Invocation::from_args(std::iter::empty::<&str>()).unwrap(),
            Invocation::Cold
        );
    }

    #[test]
    fn test_descriptor_is_warm() {
        match Invocation::from_args(["5"]).unwrap() {
            Invocation::Warm(token) => assert_eq!(token.fd(), 5),
            other => panic!("expected warm start, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(
            Invocation::from_args(["5", "6"]),
            Err(StartupError::TooManyArguments(2))
        ));
        assert!(matches!(
            Invocation::from_args(["--config"]),
            Err(StartupError::BadResumeToken(_))
        ));
        assert!(matches!(
            Invocation::from_args(["0"]),
            Err(StartupError::BadResumeToken(_))
        ));
    }
}
