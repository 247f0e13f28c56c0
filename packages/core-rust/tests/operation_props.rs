use graphops_core::{
    EntitySeed, GetElements, MultiInput, Operation, OperationChain, OperationCodec, Options,
    ToEntitySeeds,
};
use proptest::prelude::*;

fn options() -> impl Strategy<Value = Options> {
    prop::collection::btree_map("[a-z][a-z.]{0,12}", "[a-z0-9]{0,6}", 0..5)
}

fn seeds() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 0..16)
}

proptest! {
    #[test]
    fn shallow_clone_is_equal_and_independent(opts in options(), vertices in seeds()) {
        let original = GetElements::new()
            .with_input(vertices.iter().map(|v| EntitySeed::new(v.as_str())))
            .with_options(opts.clone());

        let mut copy = original.shallow_clone().unwrap();
        prop_assert_eq!(&copy, &original);

        copy.options_mut().insert("zz.added".to_string(), "1".to_string());
        copy.clear_input();
        prop_assert_eq!(original.options(), &opts);
        prop_assert_eq!(
            original.input().and_then(|i| i.values()).map(<[EntitySeed]>::len),
            Some(vertices.len())
        );
    }

    #[test]
    fn alternating_stages_validate(pattern in prop::collection::vec(any::<bool>(), 1..8)) {
        let mut chain = OperationChain::new();
        for &seeds_first in &pattern {
            if seeds_first {
                chain.push(GetElements::new());
            } else {
                chain.push(ToEntitySeeds::new());
            }
        }
        let alternating = pattern.windows(2).all(|w| w[0] != w[1]);
        prop_assert_eq!(chain.validate().is_valid(), alternating);
    }

    #[test]
    fn decoding_garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let codec = OperationCodec::with_defaults();
        let _ = codec.from_msgpack(&bytes);
        let _ = codec.from_json_str(&String::from_utf8_lossy(&bytes));
    }
}
