//! Registry integration tests
//!
//! Exercises the public API end to end: mapping sources, synthesis, text
//! expansion, explicit overrides and concurrent use.

use std::sync::Arc;
use std::thread;

use lamco_flavormap::config::Config;
use lamco_flavormap::flavor::codec;
use lamco_flavormap::registry::{FileSource, StringSource};
use lamco_flavormap::{Flavor, FlavorMapError, FlavorRegistry, Native, Representation};

fn flavor(mime: &str) -> Flavor {
    Flavor::parse(mime).unwrap()
}

fn native(name: &str) -> Native {
    Native::from(name)
}

fn registry_from(text: &str) -> FlavorRegistry {
    FlavorRegistry::builder()
        .source(StringSource::new("inline", text))
        .build()
}

#[test]
fn test_unknown_flavor_round_trips_through_encoded_native() {
    let registry = FlavorRegistry::empty();
    let foo = Flavor::new("application", "x-foo", Representation::Object).unwrap();

    let natives = registry.natives_for(Some(&foo));
    assert_eq!(natives, vec![native("ENCODED:application/x-foo")]);
    assert_eq!(registry.flavors_for(Some(&natives[0])), vec![foo.clone()]);

    // Synthesized once, then served from the table
    assert_eq!(registry.natives_for(Some(&foo)), natives);
    assert_eq!(registry.natives_for(None), natives);
}

#[test]
fn test_text_native_expands_to_full_family() {
    let registry = registry_from("TEXT_NATIVE: text/plain;charset=utf-8\n");

    let flavors = registry.flavors_for(Some(&native("TEXT_NATIVE")));
    let parsed = flavor("text/plain; charset=UTF-8");

    assert_eq!(flavors[0], parsed);
    assert_eq!(flavors[1], Flavor::string());
    assert_eq!(flavors.last(), Some(&Flavor::plain_text()));
    assert_eq!(flavors.iter().filter(|f| **f == parsed).count(), 1);

    let decoded: Vec<_> = flavors
        .iter()
        .filter(|f| f.charset() == Some("unicode") && f.representation().is_decoded_text())
        .collect();
    assert_eq!(decoded.len(), Representation::DECODED_TEXT.len());

    let utf16 = flavor("text/plain; charset=UTF-16LE; class=byte-buffer");
    assert!(flavors.contains(&utf16));
}

#[test]
fn test_explicit_flavors_replace_expansion() {
    let registry = registry_from("TEXT_NATIVE: text/plain;charset=utf-8\n");
    assert!(registry.flavors_for(Some(&native("TEXT_NATIVE"))).len() > 1);

    let g = flavor("application/x-unrelated");
    registry
        .set_flavors_for_native(&native("TEXT_NATIVE"), &[g.clone()])
        .unwrap();

    assert_eq!(registry.flavors_for(Some(&native("TEXT_NATIVE"))), vec![g]);
}

#[test]
fn test_continuation_lines_in_mapping_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("multi.properties");
    std::fs::write(
        &path,
        "# continued value\n\
         MULTI = application/\\\n\
         \x20   x-multi\n\
         NEXT = image/x-next\n",
    )
    .unwrap();

    let registry = FlavorRegistry::builder().source(FileSource::new(&path)).build();
    registry.initialize().unwrap();

    assert_eq!(registry.flavors_for(Some(&native("MULTI"))), vec![flavor("application/x-multi")]);
    assert_eq!(registry.natives_for(Some(&flavor("image/x-next"))), vec![native("NEXT")]);
    assert!(registry.diagnostics().is_empty());
}

#[test]
fn test_bad_lines_are_reported_and_skipped() {
    let registry = registry_from(
        "GOOD = image/png\n\
         BROKEN = not a mime type\n\
         ALSO_GOOD = image/gif\n",
    );

    assert_eq!(
        registry.natives_for(None),
        vec![native("GOOD"), native("ALSO_GOOD")]
    );

    let diagnostics = registry.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, 2);
}

#[test]
fn test_stray_byte_only_costs_its_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.properties");
    std::fs::write(&path, b"A = image/png\nB = text/plain;x=\xff\nC = image/gif\n").unwrap();

    let registry = FlavorRegistry::builder().source(FileSource::new(&path)).build();
    registry.initialize().unwrap();

    assert_eq!(registry.natives_for(None), vec![native("A"), native("C")]);
    let diagnostics = registry.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, 2);
}

#[test]
fn test_non_hex_escape_fails_initialization() {
    let registry = registry_from("GOOD = image/png\nBAD = \\uZZZZ\nLATER = image/gif\n");

    let err = registry.initialize().unwrap_err();
    assert!(matches!(err, FlavorMapError::MalformedEscape { line: 2, found: 0 }));
}

#[test]
fn test_truncated_escape_fails_initialization() {
    let registry = registry_from("GOOD = image/png\nBAD = text/plain\\u12");

    let err = registry.initialize().unwrap_err();
    assert!(matches!(err, FlavorMapError::MalformedEscape { .. }));
    assert!(err.is_fatal());

    // Loading is attempted once; the registry then works from an empty table
    assert!(registry.initialize().is_ok());
    assert!(registry.natives_for(None).is_empty());
}

#[test]
fn test_lazy_load_failure_leaves_registry_usable() {
    let registry = FlavorRegistry::builder()
        .source(FileSource::new("/nonexistent/flavormap.properties"))
        .build();

    let foo = flavor("application/x-foo");
    assert_eq!(registry.natives_for(Some(&foo)), vec![codec::encode_flavor(&foo)]);
}

#[test]
fn test_add_is_idempotent_and_one_directional() {
    let registry = FlavorRegistry::empty();
    let f = flavor("image/x-custom");

    registry.add_unencoded_native_for_flavor(&f, &native("A")).unwrap();
    registry.add_unencoded_native_for_flavor(&f, &native("B")).unwrap();
    registry.add_unencoded_native_for_flavor(&f, &native("A")).unwrap();

    assert_eq!(registry.natives_for(Some(&f)), vec![native("A"), native("B")]);
    assert!(registry.flavors_for(Some(&native("A"))).is_empty());
}

#[test]
fn test_set_natives_suppresses_text_buckets() {
    let registry = registry_from("PLAIN = text/plain;charset=UTF-8\n");
    let html = flavor("text/html; charset=UTF-8");
    assert_eq!(registry.natives_for(Some(&html)), vec![native("PLAIN")]);

    registry
        .set_natives_for_flavor(&html, &[native("N1"), native("N2"), native("N1")])
        .unwrap();
    assert_eq!(registry.natives_for(Some(&html)), vec![native("N1"), native("N2")]);
}

#[test]
fn test_empty_native_is_rejected() {
    let registry = FlavorRegistry::empty();
    let f = flavor("image/png");

    for bad in ["", "   "] {
        let err = registry.add_unencoded_native_for_flavor(&f, &native(bad)).unwrap_err();
        assert!(matches!(err, FlavorMapError::InvalidArgument(_)));
        assert!(registry.set_flavors_for_native(&native(bad), &[f.clone()]).is_err());
    }
    assert!(registry.set_natives_for_flavor(&f, &[native("OK"), native("")]).is_err());
    assert_eq!(registry.stats().explicit_keys, 0);
}

#[test]
fn test_repeated_queries_are_stable() {
    let registry = FlavorRegistry::new();
    let html = flavor("text/html; charset=unicode; class=string; document=selection");

    let first = registry.natives_for(Some(&html));
    let second = registry.natives_for(Some(&html));
    assert_eq!(first, second);
    assert!(registry.stats().natives_cache.hits >= 1);

    registry.clear_cache();
    assert_eq!(registry.natives_for(Some(&html)), first);
}

#[test]
fn test_null_enumerations_have_no_duplicates() {
    let registry = FlavorRegistry::new();

    let natives = registry.natives_for(None);
    let flavors = registry.flavors_for(None);
    assert!(!natives.is_empty());
    assert!(!flavors.is_empty());

    let mut sorted_natives: Vec<_> = natives.iter().map(|n| n.to_string()).collect();
    sorted_natives.sort();
    sorted_natives.dedup();
    assert_eq!(sorted_natives.len(), natives.len());

    for (i, f) in flavors.iter().enumerate() {
        assert!(!flavors[i + 1..].contains(f), "duplicate flavor {}", f);
    }
}

#[test]
fn test_maps_pick_most_preferred_entry() {
    let registry = registry_from(
        "PNG_A = image/png\n\
         PNG_B = image/png\n\
         GIF = image/gif\n",
    );

    let natives = registry.natives_map_for(&[flavor("image/png"), flavor("image/gif")]);
    assert_eq!(natives[&flavor("image/png")], native("PNG_A"));
    assert_eq!(natives[&flavor("image/gif")], native("GIF"));

    let flavors = registry.flavors_map_for(&[]);
    assert_eq!(flavors.len(), 3);
    assert_eq!(flavors[&native("PNG_B")], flavor("image/png"));
}

#[test]
fn test_registry_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let mappings = dir.path().join("app.properties");
    std::fs::write(&mappings, "APP_TARGET = application/x-app\n").unwrap();

    let config = Config::default_config().with_overrides(vec![mappings], false);
    let registry = config.build_registry();
    registry.initialize().unwrap();

    let natives = registry.natives_for(None);
    assert!(natives.contains(&native("UTF8_STRING")));
    assert_eq!(natives.last(), Some(&native("APP_TARGET")));
}

#[test]
fn test_concurrent_queries_and_mutations() {
    let registry = Arc::new(FlavorRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let f = flavor(&format!("application/x-thread-{}", i));
                let synthesized = registry.natives_for(Some(&f));
                assert_eq!(synthesized.len(), 1);

                registry
                    .add_unencoded_native_for_flavor(&f, &native(&format!("THREAD_{}", i)))
                    .unwrap();
                let natives = registry.natives_for(Some(&f));
                assert_eq!(natives[0], synthesized[0]);
                assert_eq!(natives.len(), 2);

                registry.flavors_for(Some(&native("UTF8_STRING"))).len()
            })
        })
        .collect();

    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(counts.windows(2).all(|w| w[0] == w[1]));
}
