use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }
}
