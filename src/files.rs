//! Line-oriented input files: wallets, proxies and the word list

use anyhow::{bail, Context, Result};
use eclipse_batch_types::{AccountPool, ChainAccount, Credential};
use std::path::Path;

/// Non-empty, non-comment lines, trimmed
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(parse_lines(&content))
}

pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// `address` or `address:hex-secret`
pub fn parse_account(line: &str) -> Result<ChainAccount> {
    match line.split_once(':') {
        None => Ok(ChainAccount::watch_only(line)),
        Some((address, secret)) => {
            let address = address.trim();
            if address.is_empty() {
                bail!("account line has an empty address");
            }

            let secret = secret.trim().trim_start_matches("0x");
            let bytes = hex::decode(secret)
                .with_context(|| format!("invalid hex secret for {address}"))?;
            Ok(ChainAccount::with_credential(address, Credential::new(bytes)))
        }
    }
}

pub fn read_accounts(path: &Path) -> Result<Vec<ChainAccount>> {
    read_lines(path)?
        .iter()
        .enumerate()
        .map(|(i, line)| {
            parse_account(line).with_context(|| format!("{}: line {}", path.display(), i + 1))
        })
        .collect()
}

/// Pair the EVM and Eclipse wallet files by line
pub fn load_pool(evm_path: &Path, eclipse_path: &Path) -> Result<AccountPool> {
    let evm = read_accounts(evm_path)?;
    let eclipse = read_accounts(eclipse_path)?;
    Ok(AccountPool::from_lists(evm, eclipse)?)
}

/// Missing optional files (proxies, words) read as empty
pub fn read_optional_lines(path: &Path) -> Result<Vec<String>> {
    if path.exists() {
        read_lines(path)
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines_skips_blanks_and_comments() {
        let lines = parse_lines("  a \n\n# note\nb\r\n");
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_account() {
        let watch = parse_account("0xabc").unwrap();
        assert!(!watch.can_sign());

        let signer = parse_account("0xabc:0x0102ff").unwrap();
        assert_eq!(signer.address, "0xabc");
        assert_eq!(signer.credential().unwrap().expose(), &[1, 2, 255]);

        assert!(parse_account("0xabc:zz").is_err());
        assert!(parse_account(":0102").is_err());
    }
}
