//! Known-answer tests for the full seed -> keys -> addresses pipeline.

use hd_keysmith::{
    AddressEncoder, Config, DerivationPath, Error, KeyDeriver, MultisigBuilder, MultisigPolicy,
    Network, PathParser, WalletService,
};

const SEED: &str = "3fdf3c7c40ef678dd8950caac27f8006e27fdfab5e379ff7e3cef34a0226df830a49ca85476e7873e096ca6127d365995f6f135c71c27e8efe6cd1c497f6003f";
const PATH: &str = "m / 44' / 0' / 0' / 0 / 0";

const XPRV: &str = "xprvA319vcXCEmKZe8ens22j5pGfY6WR2yEeBnPPMPE2CDpn4JaoXyYjsHWyDeDbXFXDWwuJAgbJve2772PRfVrY6jFUBj43JDbXMJ5EZQYKDhM";
const XPUB: &str = "xpub6FzWL84658srrcjFy3ZjSxDQ68LuSRxVZ1Jz9mddkZMkw6ux5WrzR5qT4wSsnG7zpfQFrAeQDeoRzec8xXy5FRz8ZDewDG3NV8nDFNjYrjZ";
const ROOT: &str = "xprv9s21ZrQH143K2pnPh3AEko6pZTqmoyFW3Kt8heSpwhSzSfSJP3T9rFome7xNkvk9GaW7M91QEvkbP22z6HwhvFqTtuisH5hHPTu5xDBQRkG";

const WIFS: [&str; 2] = [
    "cQpHXfs91s5eR9PWXui6qo2xjoJb2X3VdUspwKXe4A8Dybvut2rL",
    "cVgxEkRBtnfvd41ssd4PCsiemahAHidFrLWYoDBMNojUeME8dojZ",
];

fn seed() -> Vec<u8> {
    hex::decode(SEED).unwrap()
}

#[test]
fn components_reproduce_reference_wallet() {
    let path = PathParser::default().parse(PATH).unwrap();
    assert_eq!(path, DerivationPath::bip44(0, 0, false, 0).unwrap());

    let keys = KeyDeriver::default().derive(&seed(), &path).unwrap();
    assert_eq!(keys.root.to_string(), ROOT);
    assert_eq!(keys.private.to_string(), XPRV);
    assert_eq!(keys.public.to_string(), XPUB);
    assert_eq!(keys.private.neuter(), keys.public);

    let private_key = keys.private.private_key_bytes().unwrap();
    let addresses = AddressEncoder::default().encode(&private_key).unwrap();
    assert_eq!(addresses.wif, "L1dbCB2GPDDzxNJJ7s7h7a84NSXViBNwJeLWTS2gJMtdapfkhmg8");
    assert_eq!(addresses.p2pkh, "1AKdhnB63swG2XpSuuXWP8MqP596zRJJCz");
    assert_eq!(addresses.segwit_bech32, "bc1qvcl5rm6vz7eaxed9zrcftax0ywsc29y8zgj876");
    assert_eq!(addresses.segwit_nested, "3MTm6vsDYfyQCSTeex9ZHWYd9zkUetUn7c");
}

#[test]
fn service_reproduces_reference_wallet() {
    let wallet = WalletService::from_config(&Config::default())
        .generate_hd_wallet(SEED, PATH)
        .unwrap();
    assert_eq!(wallet.root_key, ROOT);
    assert_eq!(wallet.extended_private_key, XPRV);
    assert_eq!(wallet.extended_public_key, XPUB);
    assert_eq!(wallet.addresses.p2pkh, "1AKdhnB63swG2XpSuuXWP8MqP596zRJJCz");
}

#[test]
fn derivation_is_deterministic() {
    let service = WalletService::from_config(&Config::default());
    let first = service.generate_hd_wallet(SEED, PATH).unwrap();
    let second = service.generate_hd_wallet(SEED, "m/44'/0'/0'/0/0").unwrap();
    assert_eq!(first, second);

    let next = service.generate_hd_wallet(SEED, "m/44'/0'/0'/0/1").unwrap();
    assert_ne!(first.addresses, next.addresses);
    assert_eq!(first.root_key, next.root_key);
}

#[test]
fn testnet_config_changes_every_encoding() {
    let config = Config {
        network: Network::Testnet,
        ..Config::default()
    };
    let wallet = WalletService::from_config(&config)
        .generate_hd_wallet(SEED, PATH)
        .unwrap();
    assert!(wallet.root_key.starts_with("tprv"));
    assert!(wallet.extended_public_key.starts_with("tpub"));
    assert!(wallet.addresses.wif.starts_with('c'));
    assert!(wallet.addresses.segwit_bech32.starts_with("tb1q"));
    assert!(wallet.addresses.segwit_nested.starts_with('2'));
}

#[test]
fn legacy_multisig_vector() {
    // Thresholds swapped relative to the key list: OP_2 <k1> <k2> OP_1.
    let builder = MultisigBuilder::new(Network::Bitcoin, MultisigPolicy::Permissive);
    assert_eq!(
        builder.build_address(2, 1, &WIFS).unwrap(),
        "3MqSiHLbK6M8YUL8sXKiULeiRSvckJV74h"
    );

    let strict = MultisigBuilder::default();
    assert_eq!(
        strict.build_address(1, 2, &WIFS).unwrap(),
        "3MHoRjzuFaaVHAXqzXXpm1LtpYKq2YwUXk"
    );
}

#[test]
fn multisig_threshold_failures() {
    let builder = MultisigBuilder::default();
    for (m, n) in [(0, 2), (17, 2), (1, 0), (1, 17), (-1, 2)] {
        assert!(
            matches!(builder.build(m, n, &WIFS), Err(Error::ThresholdOutOfRange { .. })),
            "m={} n={}",
            m,
            n
        );
    }
}

#[test]
fn path_failures_stop_derivation() {
    let service = WalletService::from_config(&Config::default());
    for path in ["", "m/44'/0'/0'/0", "x/44'/0'/0'/0/0", "m/44'/0/0'/0/0", "m/44'/0'/0'/0'/0"] {
        let err = service.generate_hd_wallet(SEED, path).unwrap_err();
        assert!(err.is_invalid_input(), "{}: {}", path, err);
    }
}
