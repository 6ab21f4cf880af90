#![no_main]
use libfuzzer_sys::fuzz_target;
use symforge_crypto::cipher::StreamCipher;
use symforge_crypto::enigma::{Enigma, EnigmaConfig};
use symforge_crypto::wake::Wake;

// Layout: flags byte, 32 key bytes, message.
fuzz_target!(|data: &[u8]| {
    if data.len() < 33 {
        return;
    }
    let (flags, rest) = (data[0], &data[1..]);
    let (key, msg) = rest.split_at(32);
    let split = if msg.is_empty() {
        0
    } else {
        flags as usize % msg.len()
    };

    if let Ok(mut wake) = Wake::new(key) {
        let mut buf = msg.to_vec();
        wake.encrypt_in_place(&mut buf[..split]);
        wake.encrypt_in_place(&mut buf[split..]);
        let mut back = vec![0u8; buf.len()];
        if let Ok(mut wake) = Wake::new(key) {
            wake.decrypt(&mut back, &buf).unwrap();
            assert_eq!(back, msg);
        }
    }

    let config = EnigmaConfig {
        deck_shuffle: flags & 0x80 != 0,
    };
    if let Ok(mut enigma) = Enigma::with_config(&key[..13], config) {
        let mut buf = msg.to_vec();
        enigma.encrypt_in_place(&mut buf[..split]);
        enigma.encrypt_in_place(&mut buf[split..]);
        if let Ok(mut enigma) = Enigma::with_config(&key[..13], config) {
            enigma.decrypt_in_place(&mut buf);
            assert_eq!(buf, msg);
        }
    }
});
