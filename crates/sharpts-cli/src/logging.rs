//! Tracing setup for the CLI boundary (SPEC_FULL.md §13): `tracing` +
//! `tracing-subscriber`'s env-filter, matching `tsz-common`/`tsz-cli`'s
//! actual choice. `RUST_LOG` wins when set; `-v`/`-vv` otherwise pick a
//! coarser or finer default.

pub fn init(verbose: u8) {
    let default_filter = match verbose {
        0 => "sharpts_cli=warn,sharpts_emit=warn,sharpts_asmrw=warn",
        1 => "sharpts_cli=info,sharpts_emit=info,sharpts_asmrw=info",
        _ => "sharpts_cli=debug,sharpts_emit=debug,sharpts_asmrw=debug,sharpts_lowering=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()))
        .init();
}
