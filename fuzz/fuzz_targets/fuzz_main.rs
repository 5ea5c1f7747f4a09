// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;
use slipbox_core::encoder::{create, CreateParameter, EncoderKind};
use slipbox_core::parser::{parse_zettel, syntaxes};
use slipbox_core::{Meta, ParseConfig, Zettel, ZettelId};

fuzz_target!(|data: &[u8]| {
    let Some(zid) = ZettelId::new(20240101000000) else {
        return;
    };
    let zettel = Zettel::new(Meta::new(zid), data);
    let config = ParseConfig::default();
    for syntax in syntaxes() {
        let zn = parse_zettel(&zettel, syntax, &config);
        for kind in EncoderKind::ALL {
            let mut out = Vec::new();
            let _ = create(kind, &CreateParameter::default()).write_zettel(&mut out, &zn);
        }
    }
});
