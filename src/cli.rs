//! Shared command-line plumbing for the record tools.
//!
//! Both binaries take the same connection arguments; each adds its own
//! override and key flags on top.

use clap::Args;

use crate::engine::{Auth, ConnectConfig};
use crate::error::{RecordError, RecordResult};

/// Connection arguments common to every record tool.
#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// database name
    #[arg(short = 'd', long = "database")]
    pub database: String,

    /// table name
    #[arg(short = 't', long = "table")]
    pub table: String,

    /// host name
    #[arg(short = 'h', long = "host", default_value = "localhost")]
    pub host: String,

    /// user name
    #[arg(short = 'u', long = "user")]
    pub user: String,

    /// prompt for the password interactively (do not set with -P)
    #[arg(short = 'p', long = "prompt", conflicts_with = "password")]
    pub prompt: bool,

    /// user password (do not set with -p)
    #[arg(short = 'P', long = "password", env = "MYSQL_PWD", hide_env_values = true)]
    pub password: Option<String>,
}

impl ConnectArgs {
    /// Build the validated connection configuration.
    pub fn to_config(&self) -> RecordResult<ConnectConfig> {
        let auth = if self.prompt {
            Auth::Prompt
        } else if let Some(password) = &self.password {
            Auth::Password(password.clone())
        } else {
            return Err(RecordError::validation(
                "either --prompt or --password must be given",
            ));
        };

        Ok(ConnectConfig {
            host: self.host.clone(),
            database: self.database.clone(),
            user: self.user.clone(),
            auth,
        })
    }
}

/// Pair two positionally-matched repeatable flags, checking the counts.
pub fn pair_values(
    names: &[String],
    values: &[String],
    names_arg: &str,
    values_arg: &str,
) -> RecordResult<Vec<(String, String)>> {
    if names.len() != values.len() {
        return Err(RecordError::validation(format!(
            "{names_arg} and {values_arg} arguments count must be same"
        )));
    }
    Ok(names
        .iter()
        .cloned()
        .zip(values.iter().cloned())
        .collect())
}

/// Read a password from the terminal without echoing it.
pub fn prompt_password(user: &str) -> RecordResult<String> {
    Ok(rpassword::prompt_password(format!(
        "Enter password for user {user}: "
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(prompt: bool, password: Option<&str>) -> ConnectArgs {
        ConnectArgs {
            database: "shop".to_string(),
            table: "users".to_string(),
            host: "localhost".to_string(),
            user: "app".to_string(),
            prompt,
            password: password.map(String::from),
        }
    }

    #[test]
    fn test_auth_selection() {
        assert!(matches!(
            args(true, None).to_config().unwrap().auth,
            Auth::Prompt
        ));
        assert!(matches!(
            args(false, Some("secret")).to_config().unwrap().auth,
            Auth::Password(_)
        ));
        assert!(matches!(
            args(false, None).to_config(),
            Err(RecordError::Validation(_))
        ));
    }

    #[test]
    fn test_pair_values_counts_must_match() {
        let names = vec!["a".to_string(), "b".to_string()];
        let values = vec!["1".to_string()];
        let err = pair_values(&names, &values, "column", "replace").unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));

        let values = vec!["1".to_string(), "2".to_string()];
        let pairs = pair_values(&names, &values, "column", "replace").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("a".to_string(), "1".to_string()));
    }
}
