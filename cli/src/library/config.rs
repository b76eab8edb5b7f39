use std::env;

use anyhow::Context;

use crate::library::constant::{PASSWORD_ENV, USERNAME_ENV};

pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read API credentials from the environment before any request is sent.
    pub fn from_env() -> anyhow::Result<Self> {
        let username =
            env::var(USERNAME_ENV).with_context(|| format!("{} is not set", USERNAME_ENV))?;
        let password =
            env::var(PASSWORD_ENV).with_context(|| format!("{} is not set", PASSWORD_ENV))?;

        Ok(Credentials { username, password })
    }
}
