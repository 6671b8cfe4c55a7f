//! Request signing with temporary credentials

mod credentials;
mod sigv4;

pub(crate) use credentials::{Credentials, CredentialsProvider, EnvCredentials, StaticCredentials};
pub(crate) use sigv4::{SigningParams, sign};
