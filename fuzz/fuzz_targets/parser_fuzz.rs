//! Parser fuzz target: feed arbitrary bytes to the template parser and, when it
//! accepts them, to the code generator. Neither may panic.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(template) = msgtemplate::parse(s) {
        if let Ok(generator) = msgtemplate::Generator::new(msgtemplate::GeneratorConfig::default()) {
            let _ = generator.generate(&template);
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
