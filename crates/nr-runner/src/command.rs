//! The command to run on each trigger.
//!
//! A [`CommandSpec`] is parsed once from a shell-style command string and is
//! immutable afterwards. Splitting follows POSIX shell quoting rules (via
//! `shlex`) but nothing is expanded: no globbing, variables or pipes.

use std::fmt;

use nr_core::ConfigError;

/// A tokenized command: program name followed by its arguments.
///
/// # Examples
///
/// ```
/// use nr_runner::CommandSpec;
///
/// let spec = CommandSpec::parse(r#"go test -run 'TestFoo|TestBar' ./..."#)?;
/// assert_eq!(spec.program(), "go");
/// assert_eq!(spec.args(), ["test", "-run", "TestFoo|TestBar", "./..."]);
/// # Ok::<(), nr_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    tokens: Vec<String>,
}

impl CommandSpec {
    /// Splits `command` into tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CommandParse`] for unbalanced quotes or a
    /// trailing backslash, and [`ConfigError::EmptyCommand`] if nothing is
    /// left after splitting.
    pub fn parse(command: &str) -> Result<Self, ConfigError> {
        let tokens = shlex::split(command).ok_or_else(|| ConfigError::CommandParse {
            command: command.to_owned(),
        })?;
        Self::from_tokens(tokens)
    }

    /// Builds a spec from already-split tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        Ok(Self { tokens })
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        // Never empty: both constructors reject an empty token list.
        self.tokens.first().map_or("", String::as_str)
    }

    /// Returns the arguments after the program name.
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }

    /// Returns every token, program first.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match shlex::try_quote(token) {
                Ok(quoted) => f.write_str(&quoted)?,
                Err(_) => f.write_str(token)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let spec = CommandSpec::parse("make build").unwrap();
        assert_eq!(spec.program(), "make");
        assert_eq!(spec.args(), ["build"]);
        assert_eq!(spec.tokens().len(), 2);
    }

    #[test]
    fn test_parse_quotes_and_escapes() {
        let spec = CommandSpec::parse(r#"sh -c "echo \"hi there\"" it\'s"#).unwrap();
        assert_eq!(spec.program(), "sh");
        assert_eq!(spec.args(), ["-c", r#"echo "hi there""#, "it's"]);
    }

    #[test]
    fn test_parse_program_only() {
        let spec = CommandSpec::parse("  true  ").unwrap();
        assert_eq!(spec.program(), "true");
        assert!(spec.args().is_empty());
    }

    #[test]
    fn test_parse_empty_is_rejected() {
        assert!(matches!(CommandSpec::parse(""), Err(ConfigError::EmptyCommand)));
        assert!(matches!(CommandSpec::parse("   "), Err(ConfigError::EmptyCommand)));
    }

    #[test]
    fn test_parse_unbalanced_quote_is_rejected() {
        let err = CommandSpec::parse("make 'build").unwrap_err();
        assert!(matches!(err, ConfigError::CommandParse { ref command } if command == "make 'build"));
    }

    #[test]
    fn test_from_tokens_rejects_empty() {
        assert!(matches!(
            CommandSpec::from_tokens(Vec::<String>::new()),
            Err(ConfigError::EmptyCommand)
        ));
    }

    #[test]
    fn test_display_requotes() {
        let spec = CommandSpec::from_tokens(["echo", "hello world", "plain"]).unwrap();
        insta::assert_snapshot!(spec.to_string(), @"echo 'hello world' plain");
    }
}
