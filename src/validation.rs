use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid Ethereum address format: {0}")]
    InvalidEthAddress(String),
}

pub fn validate_eth_address(address: &str) -> Result<(), ValidationError> {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| ValidationError::InvalidEthAddress(address.to_string()))?;

    // 20 bytes, hex encoded
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidEthAddress(address.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_addresses() {
        assert!(validate_eth_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").is_ok());
        assert!(validate_eth_address("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045").is_ok());
        assert!(validate_eth_address("  0xd8da6bf26964af9d7eed9e03e53415d37aa96045  ").is_ok());
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(validate_eth_address("d8da6bf26964af9d7eed9e03e53415d37aa96045").is_err());
    }

    #[test]
    fn rejects_bad_length_and_bad_digits() {
        assert!(validate_eth_address("0x1234").is_err());
        assert!(validate_eth_address("0xZZda6bf26964af9d7eed9e03e53415d37aa96045").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            validate_eth_address(""),
            Err(ValidationError::MissingParameter(_))
        ));
    }
}
