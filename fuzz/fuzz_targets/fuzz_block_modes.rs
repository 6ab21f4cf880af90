#![no_main]
use libfuzzer_sys::fuzz_target;
use symforge_crypto::cipher::{BlockCipher, BlockMode, StreamMode};
use symforge_crypto::loki97::Loki97;
use symforge_crypto::modes::{
    Cfb64Decryptor, Cfb64Encryptor, DoubledOfb, PcbcDecryptor, PcbcEncryptor,
};
use symforge_crypto::sm4::Sm4Key;

// Layout: selector byte, 32 key bytes, 32 IV bytes, message.
fuzz_target!(|data: &[u8]| {
    if data.len() < 65 {
        return;
    }
    let (selector, rest) = (data[0], &data[1..]);
    let (key, rest) = rest.split_at(32);
    let (iv, msg) = rest.split_at(32);

    let cipher: Box<dyn BlockCipher> = match selector % 4 {
        0 => match Sm4Key::new(&key[..16]) {
            Ok(c) => Box::new(c),
            Err(_) => return,
        },
        n => match Loki97::new(&key[..8 + 8 * n as usize]) {
            Ok(c) => Box::new(c),
            Err(_) => return,
        },
    };
    let bs = cipher.block_size();

    let whole = msg.len() / bs * bs;
    let mut buf = msg[..whole].to_vec();
    if let (Ok(mut enc), Ok(mut dec)) = (
        PcbcEncryptor::new(&cipher, &iv[..bs]),
        PcbcDecryptor::new(&cipher, &iv[..bs]),
    ) {
        enc.crypt_blocks_in_place(&mut buf).unwrap();
        dec.crypt_blocks_in_place(&mut buf).unwrap();
        assert_eq!(buf, &msg[..whole]);
    }

    let mut buf = msg.to_vec();
    if let (Ok(mut enc), Ok(mut dec)) = (
        Cfb64Encryptor::new(&cipher, &iv[..bs]),
        Cfb64Decryptor::new(&cipher, &iv[..bs]),
    ) {
        enc.xor_keystream_in_place(&mut buf).unwrap();
        dec.xor_keystream_in_place(&mut buf).unwrap();
        assert_eq!(buf, msg);
    }

    let mut buf = msg.to_vec();
    if let (Ok(mut a), Ok(mut b)) = (
        DoubledOfb::new(&cipher, &iv[..2 * bs]),
        DoubledOfb::new(&cipher, &iv[..2 * bs]),
    ) {
        a.xor_keystream_in_place(&mut buf).unwrap();
        b.xor_keystream_in_place(&mut buf).unwrap();
        assert_eq!(buf, msg);
    }
});
