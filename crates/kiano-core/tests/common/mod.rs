//! Shared fixture: a small Kianoland catalog built in code.

#![allow(dead_code)]

use kiano_core::{Catalog, CatalogHandle, EngineConfig, EntityEntry, EntityType, Intent, ResponseEngine};

pub fn intent(name: &str, phrases: &[&str], response: &str) -> Intent {
    Intent {
        name: name.to_string(),
        training_phrases: phrases.iter().map(|s| s.to_string()).collect(),
        responses: vec![response.to_string()],
    }
}

pub fn entity_types() -> Vec<EntityType> {
    vec![
        EntityType {
            name: "proyek".to_string(),
            entries: vec![
                EntityEntry::new("Natureland Kiano 3", &["kiano 3", "kiano3", "nlk 3", "nlk3"]),
                EntityEntry::new("Natureland Kiano 1", &["kiano 1", "nlk 1"]),
                EntityEntry::new("Natureland Kiano 2", &["kiano 2", "nlk 2"]),
                EntityEntry::new("Green Jonggol Village", &["green jonggol village", "gjv", "green jonggol"]),
            ],
        },
        EntityType {
            name: "lokasi".to_string(),
            entries: vec![
                EntityEntry::new("Bekasi", &["bekasi", "cibarusah"]),
                EntityEntry::new("Bogor", &["bogor", "jonggol"]),
            ],
        },
        EntityType {
            name: "tipe_rumah".to_string(),
            entries: vec![EntityEntry::new("Kiano 3 Tipe 36", &["tipe 36"])],
        },
    ]
}

pub fn intents() -> Vec<Intent> {
    vec![
        intent(
            "info_harga",
            &["berapa harga rumah", "harga"],
            "{{#Natureland Kiano 3}}Harga {{proyek}} mulai Rp 300 juta.{{/Natureland Kiano 3}}\
             {{#Kiano 3 Tipe 36}}Tipe 36 di {{proyek}} Rp 350 juta.{{/Kiano 3 Tipe 36}}\
             {{#Green Jonggol Village}}Harga {{proyek}} mulai Rp 160 juta.{{/Green Jonggol Village}}\
             {{#fallback}}Proyek mana yang ingin Anda ketahui harganya?{{/fallback}}",
        ),
        intent(
            "info_promo",
            &["ada promo apa"],
            "{{#all_promos}}Promo bulan ini: bold_startDP 0%bold_end untuk semua proyek.{{/all_promos}}\
             {{#Natureland Kiano 3}}Promo {{proyek}}: gratis biaya KPR.{{/Natureland Kiano 3}}\
             {{#fallback}}Promo untuk proyek apa?{{/fallback}}",
        ),
        intent(
            "info_lokasi",
            &["dimana lokasinya"],
            "{{#Natureland Kiano 1}}{{proyek}} ada di Cibarusah.{{/Natureland Kiano 1}}\
             {{#Natureland Kiano 3}}{{proyek}} berlokasi di Cibarusah, Bekasi.{{/Natureland Kiano 3}}\
             {{#fallback}}Lokasi proyek mana yang Anda maksud?{{/fallback}}",
        ),
        intent(
            "info_proyek",
            &["info proyek", "informasi perumahan"],
            "{{#Natureland Kiano 3}}{{proyek}}: hunian asri di Cibarusah.{{/Natureland Kiano 3}}\
             {{#Green Jonggol Village}}{{proyek}}: rumah subsidi dan komersil di Jonggol.{{/Green Jonggol Village}}\
             {{#fallback}}Proyek mana yang ingin Anda ketahui?{{/fallback}}",
        ),
        intent(
            "rekomendasi_proyek",
            &["rekomendasi rumah"],
            "{{#Bekasi}}Di {{lokasi}} kami punya Natureland Kiano 3.{{/Bekasi}}\
             {{#Bogor}}Di {{lokasi}} ada Green Jonggol Village.{{/Bogor}}\
             {{#fallback}}Maaf, belum ada proyek di lokasi {{lokasi}}.{{/fallback}}",
        ),
        intent(
            "salam",
            &["halo", "selamat pagi", "hai kak"],
            "Halo! Ada yang bisa kami bantu?",
        ),
        intent(
            "default_fallback",
            &[],
            "Maaf, saya belum mengerti. Coba tanyakan harga, promo, atau lokasi.",
        ),
    ]
}

pub fn catalog() -> Catalog {
    Catalog::new(entity_types(), intents())
}

pub fn engine() -> ResponseEngine {
    ResponseEngine::new(CatalogHandle::new(catalog()), EngineConfig::default())
}
