// Copyright (c) 2022-2023 Aptos Labs

//! Application and version information APDUs

use encdec::{Decode, DecodeOwned, Encode};

use super::{read_prefixed, ApduError, ApduStatic, Instruction};

/// Implement an empty request APDU for the provided instruction
macro_rules! empty_request {
    ($t:ident, $ins:expr) => {
        impl ApduStatic for $t {
            const CLA: u8 = $ins.cla();

            const INS: u8 = $ins.ins();
        }

        impl Encode for $t {
            type Error = ApduError;

            fn encode_len(&self) -> Result<usize, Self::Error> {
                Ok(0)
            }

            fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
                Ok(0)
            }
        }

        impl DecodeOwned for $t {
            type Output = Self;

            type Error = ApduError;

            fn decode_owned(_buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
                Ok((Self, 0))
            }
        }
    };
}

/// Fetch running application name and version (BOLOS class `0xb0`)
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct AppAndVersionReq;

empty_request!(AppAndVersionReq, Instruction::GetAppAndVersion);

/// Application and version response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    FORMAT     |   NAME_LEN    |           NAME...             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  VERSION_LEN  |                  VERSION...                   /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  FLAGS_LEN    |           FLAGS... (optional)                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AppAndVersionResp<'a> {
    /// Response format (`1` for current BOLOS releases)
    pub format: u8,

    /// Application name
    pub name: &'a str,

    /// Application version
    pub version: &'a str,

    /// Application flags, when reported
    pub flags: Option<&'a [u8]>,
}

impl<'a> AppAndVersionResp<'a> {
    /// Create a new application and version response
    pub fn new(name: &'a str, version: &'a str) -> Self {
        Self {
            format: 1,
            name,
            version,
            flags: None,
        }
    }
}

impl<'a> Encode for AppAndVersionResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        let mut len = 3 + self.name.len() + self.version.len();
        if let Some(f) = self.flags {
            len += 1 + f.len();
        }
        Ok(len)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[index] = self.format;
        index += 1;

        for f in [self.name.as_bytes(), self.version.as_bytes()]
            .into_iter()
            .chain(self.flags)
        {
            if f.len() > u8::MAX as usize {
                return Err(ApduError::InvalidLength);
            }

            buff[index] = f.len() as u8;
            buff[index + 1..][..f.len()].copy_from_slice(f);
            index += 1 + f.len();
        }

        Ok(index)
    }
}

impl<'a> Decode<'a> for AppAndVersionResp<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode an app and version response, every byte must be accounted for
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let (format, rest) = match buff.split_first() {
            Some((f, r)) => (*f, r),
            None => return Err(ApduError::MalformedResponse),
        };

        let (name, rest) = read_prefixed(rest)?;
        let (version, rest) = read_prefixed(rest)?;

        // Flags are omitted by some firmware releases
        let flags = match rest.is_empty() {
            true => None,
            false => {
                let (flags, rest) = read_prefixed(rest)?;
                if !rest.is_empty() {
                    return Err(ApduError::MalformedResponse);
                }
                Some(flags)
            }
        };

        Ok((
            Self {
                format,
                name: ascii_str(name)?,
                version: ascii_str(version)?,
                flags,
            },
            buff.len(),
        ))
    }
}

/// Fetch application version
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct VersionReq;

empty_request!(VersionReq, Instruction::GetVersion);

/// Application version response APDU
///
/// ## Encoding
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     MAJOR     |     MINOR     |     PATCH     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VersionResp {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Encode for VersionResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(3)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < 3 {
            return Err(ApduError::InvalidLength);
        }

        buff[..3].copy_from_slice(&[self.major, self.minor, self.patch]);

        Ok(3)
    }
}

impl DecodeOwned for VersionResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        match buff {
            [major, minor, patch] => Ok((
                Self {
                    major: *major,
                    minor: *minor,
                    patch: *patch,
                },
                3,
            )),
            _ => Err(ApduError::MalformedResponse),
        }
    }
}

/// Fetch application name
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct AppNameReq;

empty_request!(AppNameReq, Instruction::GetAppName);

/// Application name response APDU, the whole body is the ASCII name
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AppNameResp<'a> {
    pub name: &'a str,
}

impl<'a> Encode for AppNameResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(self.name.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.name.len();
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[..n].copy_from_slice(self.name.as_bytes());

        Ok(n)
    }
}

impl<'a> Decode<'a> for AppNameResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        Ok((
            Self {
                name: ascii_str(buff)?,
            },
            buff.len(),
        ))
    }
}

fn ascii_str(b: &[u8]) -> Result<&str, ApduError> {
    if !b.is_ascii() {
        return Err(ApduError::InvalidUtf8);
    }
    core::str::from_utf8(b).map_err(|_| ApduError::InvalidUtf8)
}
