use rand::{CryptoRng, RngCore};

pub const CODE_LEN: usize = 6;
pub const TOKEN_BYTES: usize = 16;

/// Six uniformly distributed decimal digits.
///
/// Bytes >= 250 are discarded so that `b % 10` carries no bias.
pub fn generate_code<R: RngCore + CryptoRng>(rng: &mut R) -> Result<String, rand::Error> {
    let mut code = String::with_capacity(CODE_LEN);
    let mut buf = [0u8; 16];
    while code.len() < CODE_LEN {
        rng.try_fill_bytes(&mut buf)?;
        for b in buf.iter().copied().filter(|b| *b < 250) {
            if code.len() == CODE_LEN {
                break;
            }
            code.push(char::from(b'0' + b % 10));
        }
    }
    Ok(code)
}

/// 128 random bits as 32 lowercase hex characters.
pub fn generate_token<R: RngCore + CryptoRng>(rng: &mut R) -> Result<String, rand::Error> {
    let mut bytes = [0u8; TOKEN_BYTES];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}
