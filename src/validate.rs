use std::fmt;

use crate::config::ClientConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileRejection {
    Extension { allowed: Vec<String> },
    TooLarge { limit_bytes: u64 },
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRejection::Extension { allowed } => {
                let list = allowed
                    .iter()
                    .map(|ext| format!(".{ext}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Please upload a valid file ({list})")
            }
            FileRejection::TooLarge { limit_bytes } => {
                write!(f, "File size must be less than {}", size_label(*limit_bytes))
            }
        }
    }
}

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Whole megabytes print as `16MB`; anything under 1 MiB in rounded-up kilobytes.
fn size_label(bytes: u64) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{}KB", bytes.div_ceil(KIB))
    }
}

/// Text after the last `.`, lowercased. A name without a dot is its own extension.
pub fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

pub fn validate_file(config: &ClientConfig, name: &str, size: u64) -> Result<(), FileRejection> {
    let extension = extension_of(name);
    if !config.allowed_extensions.iter().any(|ext| *ext == extension) {
        return Err(FileRejection::Extension {
            allowed: config.allowed_extensions.clone(),
        });
    }
    if size > config.max_upload_bytes {
        return Err(FileRejection::TooLarge {
            limit_bytes: config.max_upload_bytes,
        });
    }
    Ok(())
}
