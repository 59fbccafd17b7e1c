//! Message codecs generated at build time from `templates/conformance.msg`.

include!(concat!(env!("OUT_DIR"), "/messages.rs"));
