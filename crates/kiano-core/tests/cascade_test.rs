//! Integration test: rule cascade end to end (extract → resolve → render → format).
//!
//! Covers each rule of the cascade against the fixture catalog in `common`, the precedence
//! between rules, and the guarantee that every input yields a non-empty answer.

mod common;

use kiano_core::{
    Catalog, CatalogHandle, Channel, EngineConfig, RenderingContext, ResponseEngine, Rule,
};
use std::sync::Arc;

#[test]
fn price_question_selects_project_block() {
    let engine = common::engine();
    let resolution = engine.explain("harga kiano 3");
    assert_eq!(resolution.intent, "info_harga");
    assert_eq!(resolution.rule, Rule::TopicKeyword);
    assert_eq!(resolution.context.selector(), Some("Natureland Kiano 3"));

    let answer = engine.respond("harga kiano 3");
    assert_eq!(answer.raw, "Harga Natureland Kiano 3 mulai Rp 300 juta.");
}

#[test]
fn unknown_numbered_project_lists_available_projects() {
    let engine = common::engine();
    let resolution = engine.explain("info kiano 9");
    assert_eq!(resolution.rule, Rule::UnavailableProject);
    assert_eq!(resolution.intent, "proyek_tidak_tersedia");

    let answer = engine.respond("info kiano 9");
    assert!(answer.raw.contains("'Natureland Kiano 9' tidak ada"));
    assert!(answer.raw.contains("• Natureland Kiano 3"));
    assert!(answer.raw.contains("• Green Jonggol Village"));
}

#[test]
fn unavailable_project_beats_topic_keyword() {
    let engine = common::engine();
    let resolution = engine.explain("harga kiano 9 berapa?");
    assert_eq!(resolution.rule, Rule::UnavailableProject);
}

#[test]
fn retired_project_recommends_alternatives() {
    let engine = common::engine();
    let resolution = engine.explain("info kiano 1");
    assert_eq!(resolution.rule, Rule::RetiredProject);

    let answer = engine.respond("info kiano 1");
    assert!(answer.raw.starts_with("Maaf, proyek Natureland Kiano 1 sudah sold out."));
    assert!(answer.raw.contains("• Natureland Kiano 3 (Cibarusah, Bekasi)"));
    assert!(answer.raw.contains("• Green Jonggol Village (Jonggol, Bogor)"));
    assert!(answer.raw.ends_with("Ketik 'info [nama_proyek]' untuk detail lebih lanjut."));
}

#[test]
fn retired_project_still_answers_location_question() {
    let engine = common::engine();
    let resolution = engine.explain("lokasi kiano 1 dimana");
    assert_eq!(resolution.rule, Rule::TopicKeyword);
    assert_eq!(resolution.intent, "info_lokasi");
    assert_eq!(
        engine.respond("lokasi kiano 1 dimana").raw,
        "Natureland Kiano 1 ada di Cibarusah."
    );
}

#[test]
fn promo_without_project_uses_aggregate_block() {
    let engine = common::engine();
    let resolution = engine.explain("ada promo apa?");
    assert_eq!(resolution.intent, "info_promo");
    assert_eq!(resolution.context.selector(), Some("all_promos"));

    let answer = engine.respond("ada promo apa?");
    assert_eq!(answer.discord, "Promo bulan ini: **DP 0%** untuk semua proyek.");
    assert_eq!(answer.telegram, "Promo bulan ini: <b>DP 0%</b> untuk semua proyek.");
}

#[test]
fn promo_outranks_price_for_a_project() {
    let engine = common::engine();
    let answer = engine.respond("promo dan harga kiano 3");
    assert_eq!(answer.raw, "Promo Natureland Kiano 3: gratis biaya KPR.");
}

#[test]
fn house_type_is_preferred_over_project() {
    let engine = common::engine();
    let resolution = engine.explain("harga tipe 36 kiano 3");
    assert_eq!(resolution.context.primary_selector.as_deref(), Some("Kiano 3 Tipe 36"));
    assert_eq!(resolution.context.project.as_deref(), Some("Natureland Kiano 3"));
    assert_eq!(
        engine.respond("harga tipe 36 kiano 3").raw,
        "Tipe 36 di Natureland Kiano 3 Rp 350 juta."
    );
}

#[test]
fn topic_without_project_asks_for_clarification() {
    let engine = common::engine();
    assert_eq!(
        engine.respond("berapa harganya?").raw,
        "Proyek mana yang ingin Anda ketahui harganya?"
    );
}

#[test]
fn bare_project_mention_gives_project_info() {
    let engine = common::engine();
    let resolution = engine.explain("kiano 3 dong");
    assert_eq!(resolution.rule, Rule::ProjectInfo);
    assert_eq!(
        engine.respond("kiano 3 dong").raw,
        "Natureland Kiano 3: hunian asri di Cibarusah."
    );
}

#[test]
fn category_keyword_forces_project_and_prefixes_intro() {
    let engine = common::engine();
    let resolution = engine.explain("ada rumah subsidi?");
    assert_eq!(resolution.rule, Rule::CategoryShortcut);
    assert_eq!(resolution.context.project.as_deref(), Some("Green Jonggol Village"));

    let answer = engine.respond("ada rumah subsidi?");
    assert!(answer
        .raw
        .starts_with("Untuk rumah subsidi, kami merekomendasikan **Green Jonggol Village**."));
    assert!(answer
        .raw
        .ends_with("Green Jonggol Village: rumah subsidi dan komersil di Jonggol."));
    assert!(answer.web.contains("<strong>Green Jonggol Village</strong>"));
}

#[test]
fn recommendation_scoped_to_location() {
    let engine = common::engine();
    let resolution = engine.explain("rekomendasi rumah di bekasi");
    assert_eq!(resolution.rule, Rule::Recommendation);
    assert_eq!(
        engine.respond("rekomendasi rumah di bekasi").raw,
        "Di Bekasi kami punya Natureland Kiano 3."
    );
}

#[test]
fn recommendation_without_location_is_unscoped() {
    let engine = common::engine();
    assert_eq!(
        engine.respond("rekomendasi rumah dong").raw,
        "Maaf, belum ada proyek di lokasi tersebut."
    );
}

#[test]
fn similarity_picks_closest_training_phrase() {
    let engine = common::engine();
    let resolution = engine.explain("selamat pagi kak");
    assert_eq!(resolution.rule, Rule::Similarity);
    assert_eq!(resolution.intent, "salam");
    let score = resolution.score.unwrap();
    assert!(score > 0.65 && score <= 1.0);
    assert_eq!(engine.respond("selamat pagi kak").raw, "Halo! Ada yang bisa kami bantu?");
}

#[test]
fn similarity_tie_keeps_catalog_order() {
    let catalog = Catalog::new(
        vec![],
        vec![
            common::intent("pamit_a", &["sampai jumpa"], "A"),
            common::intent("pamit_b", &["sampai jumpa"], "B"),
        ],
    );
    let engine = ResponseEngine::new(CatalogHandle::new(catalog), EngineConfig::default());
    assert_eq!(engine.explain("sampai jumpa").intent, "pamit_a");
}

#[test]
fn threshold_override_can_reject_a_match() {
    let mut config = EngineConfig::default();
    config
        .similarity
        .threshold_overrides
        .insert("salam".to_string(), 0.9);
    let engine = ResponseEngine::new(CatalogHandle::new(common::catalog()), config);
    assert_eq!(engine.explain("selamat pagi kak").rule, Rule::DefaultFallback);
}

#[test]
fn gibberish_falls_back_to_default_intent() {
    let engine = common::engine();
    let resolution = engine.explain("xyzzy qwerty");
    assert_eq!(resolution.rule, Rule::DefaultFallback);
    assert_eq!(resolution.context, RenderingContext::default());
    assert_eq!(
        engine.respond("xyzzy qwerty").raw,
        "Maaf, saya belum mengerti. Coba tanyakan harga, promo, atau lokasi."
    );
}

#[test]
fn missing_default_fallback_uses_apology() {
    let intents = common::intents()
        .into_iter()
        .filter(|i| i.name != "default_fallback")
        .collect();
    let catalog = Catalog::new(common::entity_types(), intents);
    let engine = ResponseEngine::new(CatalogHandle::new(catalog), EngineConfig::default());
    let resolution = engine.explain("xyzzy qwerty");
    assert_eq!(resolution.rule, Rule::Apology);
    assert_eq!(
        engine.respond("xyzzy qwerty").raw,
        "Maaf, saya tidak dapat memproses permintaan Anda saat ini."
    );
}

#[test]
fn empty_catalog_answers_with_apology() {
    let engine = ResponseEngine::new(CatalogHandle::empty(), EngineConfig::default());
    for text in ["harga kiano 3", "info kiano 9", "halo"] {
        assert_eq!(
            engine.respond(text).raw,
            "Maaf, saya tidak dapat memproses permintaan Anda saat ini."
        );
    }
}

#[test]
fn every_input_gets_a_non_empty_answer() {
    let engine = common::engine();
    let inputs = [
        "",
        "   ",
        "!!!",
        "🏠🏠🏠",
        "okeee mauuuu",
        "harga",
        "kiano",
        "nlk 2 lokasi",
        "gjv subsidi promo",
        "tolong bantu saya",
        "\\n\\n",
    ];
    for text in inputs {
        let answer = engine.respond(text);
        assert!(!answer.raw.trim().is_empty(), "empty answer for {:?}", text);
        assert!(!answer.segments(Channel::Web).is_empty());
    }
}

#[test]
fn concurrent_readers_survive_reload() {
    let engine = Arc::new(common::engine());
    std::thread::scope(|scope| {
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for _ in 0..200 {
                    let answer = engine.respond("harga kiano 3");
                    assert!(!answer.raw.is_empty());
                }
            });
        }
        let engine = Arc::clone(&engine);
        scope.spawn(move || {
            for i in 0..50 {
                let catalog = if i % 2 == 0 { Catalog::empty() } else { common::catalog() };
                engine.catalog().install(catalog);
            }
        });
    });
}

#[test]
fn every_value_and_synonym_is_detected() {
    let engine = common::engine();
    for entity_type in common::entity_types() {
        for entry in &entity_type.entries {
            let names = std::iter::once(entry.value.as_str())
                .chain(entry.synonyms.iter().map(String::as_str));
            for name in names {
                let detected = engine.extract(&format!("tolong {} ya", name));
                assert_eq!(
                    detected.get(&entity_type.name),
                    Some(entry.value.as_str()),
                    "{} via '{}'",
                    entity_type.name,
                    name
                );
            }
        }
    }
}

#[test]
fn synonyms_inside_longer_words_are_ignored() {
    let engine = common::engine();
    let detected = engine.extract("gjvillage bekasiku");
    assert!(detected.get("proyek").is_none());
    assert!(detected.get("lokasi").is_none());
}

#[test]
fn house_type_without_block_answers_for_the_project() {
    let engine = common::engine();
    let resolution = engine.explain("lokasi tipe 36 kiano 3");
    assert_eq!(resolution.intent, "info_lokasi");
    assert_eq!(resolution.context.selector(), Some("Natureland Kiano 3"));
    assert_eq!(
        engine.respond("lokasi tipe 36 kiano 3").raw,
        "Natureland Kiano 3 berlokasi di Cibarusah, Bekasi."
    );
}

#[test]
fn house_type_without_project_asks_for_the_project() {
    let engine = common::engine();
    let resolution = engine.explain("harga tipe 36");
    assert_eq!(resolution.context.primary_selector, None);
    assert_eq!(
        engine.respond("harga tipe 36").raw,
        "Proyek mana yang ingin Anda ketahui harganya?"
    );
}

#[test]
fn retired_project_exemption_follows_winning_topic() {
    let engine = common::engine();
    let resolution = engine.explain("promo dan harga kiano 1");
    assert_eq!(resolution.rule, Rule::RetiredProject);
    assert!(engine
        .respond("promo dan harga kiano 1")
        .raw
        .starts_with("Maaf, proyek Natureland Kiano 1 sudah sold out."));
}

#[test]
fn project_info_boost_decides_similarity_for_retired_project() {
    let catalog = Catalog::new(
        common::entity_types(),
        vec![
            common::intent(
                "info_proyek",
                &["harga kiano 1 bagaimana"],
                "{{#Natureland Kiano 1}}{{proyek}} sudah terjual habis.{{/Natureland Kiano 1}}",
            ),
            common::intent("default_fallback", &[], "Maaf, belum paham."),
        ],
    );
    let unboosted = kiano_core::similarity("harga kiano 1", "harga kiano 1 bagaimana");
    assert!(unboosted < 0.65);

    let engine = ResponseEngine::new(CatalogHandle::new(catalog), EngineConfig::default());
    let resolution = engine.explain("harga kiano 1");
    assert_eq!(resolution.rule, Rule::Similarity);
    assert_eq!(resolution.intent, "info_proyek");
    let score = resolution.score.unwrap();
    assert!(score > unboosted);
    assert!((score - (unboosted + 0.2)).abs() < 1e-9);
    assert_eq!(
        engine.respond("harga kiano 1").raw,
        "Natureland Kiano 1 sudah terjual habis."
    );

    let mut config = EngineConfig::default();
    config.similarity.project_info_boost = 0.0;
    let engine = ResponseEngine::new(engine.catalog().clone(), config);
    assert_eq!(engine.explain("harga kiano 1").rule, Rule::DefaultFallback);
}

#[test]
fn purchase_intent_stays_a_similarity_candidate() {
    let mut intents = common::intents();
    intents.push(common::intent(
        "minat_beli",
        &["jadwal survei unit"],
        "Silakan pilih jadwal survei.",
    ));
    let catalog = Catalog::new(common::entity_types(), intents);
    let engine = ResponseEngine::new(CatalogHandle::new(catalog), EngineConfig::default());

    let resolution = engine.explain("jadwal survey unit");
    assert_eq!(resolution.rule, Rule::Similarity);
    assert_eq!(resolution.intent, "minat_beli");
}
