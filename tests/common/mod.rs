//! In-memory card used by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use eid_card::{Transport, TransportError};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

pub const MF: u16 = 0x3F00;
pub const PIN: &str = "155882";
pub const PIN_TRIES: u8 = 3;

pub const PERSONAL_INFO: &[u8] =
    b"\x01\x0b12345678901\x02\x11AYSE FATMA YILMAZ\x03\x05JOHN\x04TR1604\x0520300101";
pub const DOCUMENT_INFO: &[u8] = b"\x00\x01\x10A12B34567\x00\x0220300101";

type DfPath = Vec<u16>;

struct CardState {
    dfs: Vec<DfPath>,
    df_names: HashMap<Vec<u8>, DfPath>,
    files: HashMap<(DfPath, u16), Vec<u8>>,
    current_df: Option<DfPath>,
    current_ef: Option<(DfPath, u16)>,
    pin: Vec<u8>,
    tries_left: u8,
    verified: bool,
    mse: Option<Vec<u8>>,
    fail_read_at: Option<u16>,
    log: Vec<Vec<u8>>,
}

/// Card with the MF/DF/EF layout of the national eID, a PIN counter and an
/// on-card RSA key. Answers only what the driver sends.
pub struct VirtualCard {
    state: Mutex<CardState>,
    key: RsaPrivateKey,
}

impl VirtualCard {
    pub fn new(key: RsaPrivateKey, certificate: Vec<u8>) -> Self {
        let mut files = HashMap::new();
        files.insert((vec![MF, 0x3D00], 0x2F04), PERSONAL_INFO.to_vec());
        files.insert((vec![MF, 0x3D10, 0x3D20], 0x2F1A), DOCUMENT_INFO.to_vec());
        files.insert((vec![MF], 0x2F53), certificate);

        let mut df_names = HashMap::new();
        df_names.insert(b"ESIGN".to_vec(), vec![MF, 0x3D00]);

        Self {
            state: Mutex::new(CardState {
                dfs: vec![
                    vec![MF],
                    vec![MF, 0x3D00],
                    vec![MF, 0x3D10],
                    vec![MF, 0x3D10, 0x3D20],
                ],
                df_names,
                files,
                current_df: None,
                current_ef: None,
                pin: PIN.as_bytes().to_vec(),
                tries_left: PIN_TRIES,
                verified: false,
                mse: None,
                fail_read_at: None,
                log: Vec::new(),
            }),
            key,
        }
    }

    pub fn with_bcd_pin(self, pin: Vec<u8>) -> Self {
        self.state.lock().unwrap().pin = pin;
        self
    }

    pub fn failing_read_at(self, offset: u16) -> Self {
        self.state.lock().unwrap().fail_read_at = Some(offset);
        self
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.key.to_public_key()
    }

    /// Every command received, as uppercase hex.
    pub fn log(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .log
            .iter()
            .map(hex::encode_upper)
            .collect()
    }

    fn handle(&self, s: &mut CardState, apdu: &[u8]) -> Vec<u8> {
        if apdu.len() < 4 {
            return sw(0x67, 0x00);
        }
        let (ins, p1, p2) = (apdu[1], apdu[2], apdu[3]);
        let data = if apdu.len() > 5 {
            let lc = usize::from(apdu[4]);
            &apdu[5..5 + lc]
        } else {
            &[][..]
        };
        let le = if apdu.len() == 5 {
            Some(apdu[4])
        } else if apdu.len() > 5 + data.len() {
            Some(apdu[5 + data.len()])
        } else {
            None
        };

        match ins {
            0xA4 => self.select(s, p1, data),
            0xB0 => self.read_binary(s, p1, p2, le.unwrap_or(0)),
            0x20 => self.verify(s, data),
            0x22 => {
                if data.windows(3).any(|w| w == [0x84, 0x01, 0x81]) {
                    s.mse = Some(data.to_vec());
                    sw(0x90, 0x00)
                } else {
                    s.mse = None;
                    sw(0x6A, 0x88)
                }
            }
            0x2A => self.sign(s, data),
            _ => sw(0x6D, 0x00),
        }
    }

    fn select(&self, s: &mut CardState, p1: u8, data: &[u8]) -> Vec<u8> {
        let fid = if data.len() == 2 {
            u16::from_be_bytes([data[0], data[1]])
        } else {
            0
        };
        match p1 {
            0x00 if fid == MF => {
                s.current_df = Some(vec![MF]);
                s.current_ef = None;
            }
            0x01 => {
                let Some(mut path) = s.current_df.clone() else {
                    return sw(0x6A, 0x82);
                };
                path.push(fid);
                if !s.dfs.contains(&path) {
                    return sw(0x6A, 0x82);
                }
                s.current_df = Some(path);
                s.current_ef = None;
            }
            0x02 => {
                let Some(df) = s.current_df.clone() else {
                    return sw(0x6A, 0x82);
                };
                if !s.files.contains_key(&(df.clone(), fid)) {
                    return sw(0x6A, 0x82);
                }
                s.current_ef = Some((df, fid));
            }
            0x04 => {
                let Some(path) = s.df_names.get(data).cloned() else {
                    return sw(0x6A, 0x82);
                };
                s.current_df = Some(path);
                s.current_ef = None;
            }
            _ => return sw(0x6A, 0x86),
        }
        sw(0x90, 0x00)
    }

    fn read_binary(&self, s: &mut CardState, p1: u8, p2: u8, le: u8) -> Vec<u8> {
        let Some(key) = s.current_ef.clone() else {
            return sw(0x69, 0x86);
        };
        let offset = u16::from_be_bytes([p1 & 0x7F, p2]);
        if s.fail_read_at == Some(offset) {
            return sw(0x65, 0x81);
        }
        let content = &s.files[&key];
        let start = usize::from(offset);
        if start >= content.len() {
            return sw(0x6B, 0x00);
        }
        let want = if le == 0 { 256 } else { usize::from(le) };
        let end = (start + want).min(content.len());
        let mut out = content[start..end].to_vec();
        out.extend_from_slice(&[0x90, 0x00]);
        out
    }

    fn verify(&self, s: &mut CardState, data: &[u8]) -> Vec<u8> {
        if s.tries_left == 0 {
            return sw(0x69, 0x83);
        }
        if data == s.pin.as_slice() {
            s.tries_left = PIN_TRIES;
            s.verified = true;
            sw(0x90, 0x00)
        } else {
            s.tries_left -= 1;
            s.verified = false;
            sw(0x63, 0xC0 | s.tries_left)
        }
    }

    fn sign(&self, s: &mut CardState, input: &[u8]) -> Vec<u8> {
        let Some(mse) = &s.mse else {
            return sw(0x69, 0x85);
        };
        if !s.verified {
            return sw(0x69, 0x82);
        }
        let pss = mse.windows(3).any(|w| w == [0x80, 0x01, 0x91]);
        let signature = if pss {
            self.key
                .sign_with_rng(&mut rand::thread_rng(), Pss::new::<Sha256>(), input)
        } else {
            self.key.sign(Pkcs1v15Sign::new_unprefixed(), input)
        };
        match signature {
            Ok(mut sig) => {
                sig.extend_from_slice(&[0x90, 0x00]);
                sig
            }
            Err(_) => sw(0x6A, 0x80),
        }
    }
}

impl Transport for VirtualCard {
    fn transmit(&self, apdu: &[u8]) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.log.push(apdu.to_vec());
        Ok(self.handle(&mut state, apdu))
    }
}

/// Lets a test keep a handle on the card after boxing it into a session.
pub struct Shared(pub std::sync::Arc<VirtualCard>);

impl Transport for Shared {
    fn transmit(&self, apdu: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.0.transmit(apdu)
    }
}

fn sw(sw1: u8, sw2: u8) -> Vec<u8> {
    vec![sw1, sw2]
}

pub fn test_key() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap()
}

fn tlv(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    match body.len() {
        n if n < 0x80 => out.push(n as u8),
        n if n < 0x100 => out.extend_from_slice(&[0x81, n as u8]),
        n => out.extend_from_slice(&[0x82, (n >> 8) as u8, n as u8]),
    }
    out.extend_from_slice(body);
    out
}

fn uint(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    let mut body = Vec::new();
    if bytes[start] & 0x80 != 0 {
        body.push(0);
    }
    body.extend_from_slice(&bytes[start..]);
    tlv(0x02, &body)
}

/// Self-contained X.509 v3 certificate for `key`. `signature_len` sizes the
/// (meaningless) outer signature so the encoding can be made as large as a
/// real card certificate.
pub fn certificate_der(
    key: &RsaPublicKey,
    not_before: &str,
    not_after: &str,
    signature_len: usize,
) -> Vec<u8> {
    let time = |t: &str| tlv(if t.len() == 13 { 0x17 } else { 0x18 }, t.as_bytes());
    let sha256_rsa = tlv(0x30, &hex::decode("06092A864886F70D01010B0500").unwrap());
    let cn = [hex::decode("0603550403").unwrap(), tlv(0x13, b"AYSE YILMAZ")].concat();
    let name = tlv(0x30, &tlv(0x31, &tlv(0x30, &cn)));

    let rsa_key = [uint(&key.n().to_bytes_be()), uint(&key.e().to_bytes_be())].concat();
    let spki = [
        hex::decode("300D06092A864886F70D0101010500").unwrap(),
        tlv(0x03, &[vec![0u8], tlv(0x30, &rsa_key)].concat()),
    ]
    .concat();

    let basic_constraints = hex::decode("300F0603551D130101FF040530030101FF").unwrap();

    let tbs = [
        tlv(0xA0, &uint(&[2])),
        uint(&[0x0A, 0xBC]),
        sha256_rsa.clone(),
        name.clone(),
        tlv(0x30, &[time(not_before), time(not_after)].concat()),
        name,
        tlv(0x30, &spki),
        tlv(0xA3, &tlv(0x30, &basic_constraints)),
    ]
    .concat();

    let signature = [vec![0u8], vec![0x5A; signature_len]].concat();
    tlv(
        0x30,
        &[tlv(0x30, &tbs), sha256_rsa, tlv(0x03, &signature)].concat(),
    )
}

pub fn to_pem(der: &[u8]) -> Vec<u8> {
    use base64::Engine;
    let body = base64::engine::general_purpose::STANDARD.encode(der);
    let mut pem = String::from("-----BEGIN CERTIFICATE-----\n");
    for line in body.as_bytes().chunks(64) {
        pem.push_str(std::str::from_utf8(line).unwrap());
        pem.push('\n');
    }
    pem.push_str("-----END CERTIFICATE-----\n");
    pem.into_bytes()
}
