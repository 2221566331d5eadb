//! Week-tiered clue pools and selection.
//!
//! Early weeks speak in riddles, week 3 narrows to the city, and from
//! week 4 the texts may interpolate literal target attributes (address,
//! rounded coordinates, numeric specs). Prize clues never interpolate
//! the target's brand or model, in any week.
//!
//! Selection is a pure function over (week, category, target, used set,
//! rng); recording the chosen key as used is the caller's job.

use std::collections::HashSet;

use rand::Rng;

use cluetrail_common::{ActiveTarget, ClueCategory};

/// Probability that a clue is flagged as deliberately misleading.
/// Opaque to the engine; downstream consumers decide what to do with it.
pub const MISLEADING_PROBABILITY: f64 = 0.25;

/// A candidate clue. `key` is the stable identity used for
/// repeat-avoidance markers; texts may carry `{city}`, `{address}`,
/// `{lat}`, `{lng}`, `{horsepower}` and `{color}` placeholders.
struct ClueTemplate {
    key: &'static str,
    title_it: &'static str,
    title_en: &'static str,
    text_it: &'static str,
    text_en: &'static str,
}

/// A clue chosen for delivery, fully rendered.
#[derive(Debug, Clone)]
pub struct SelectedClue {
    pub key: String,
    pub title_it: String,
    pub title_en: String,
    pub description_it: String,
    pub description_en: String,
    pub is_misleading: bool,
}

// --- Pools ---

const LOCATION_VAGUE: &[ClueTemplate] = &[
    ClueTemplate {
        key: "loc-vague-north",
        title_it: "Guarda a nord",
        title_en: "Look north",
        text_it: "La meta è più a nord di quanto pensi.",
        text_en: "The goal lies further north than you think.",
    },
    ClueTemplate {
        key: "loc-vague-water",
        title_it: "Acqua vicina",
        title_en: "Near water",
        text_it: "Un corso d'acqua scorre non lontano dal punto che cerchi.",
        text_en: "A waterway flows not far from the spot you seek.",
    },
    ClueTemplate {
        key: "loc-vague-old-stones",
        title_it: "Pietre antiche",
        title_en: "Ancient stones",
        text_it: "Dove la storia ha lasciato le sue pietre, la ricerca comincia.",
        text_en: "Where history left its stones, the search begins.",
    },
    ClueTemplate {
        key: "loc-vague-crowds",
        title_it: "Lontano dalla folla",
        title_en: "Away from the crowd",
        text_it: "Il premio non ama la folla: cerca dove il rumore si spegne.",
        text_en: "The prize avoids crowds: look where the noise dies down.",
    },
    ClueTemplate {
        key: "loc-vague-sunset",
        title_it: "Verso il tramonto",
        title_en: "Toward the sunset",
        text_it: "Segui la direzione del sole quando scende.",
        text_en: "Follow the direction of the sun as it sets.",
    },
    ClueTemplate {
        key: "loc-vague-hills",
        title_it: "Tra le colline",
        title_en: "Among the hills",
        text_it: "Un saliscendi di colline custodisce il segreto.",
        text_en: "Rolling hills guard the secret.",
    },
];

const LOCATION_MEDIUM: &[ClueTemplate] = &[
    ClueTemplate {
        key: "loc-medium-city",
        title_it: "La città giusta",
        title_en: "The right city",
        text_it: "Il punto che cerchi respira l'aria di {city}.",
        text_en: "The spot you seek breathes the air of {city}.",
    },
    ClueTemplate {
        key: "loc-medium-outskirts",
        title_it: "Ai margini",
        title_en: "On the outskirts",
        text_it: "Non nel cuore di {city}, ma nemmeno troppo lontano dalle sue strade.",
        text_en: "Not in the heart of {city}, but not far from its streets either.",
    },
    ClueTemplate {
        key: "loc-medium-district",
        title_it: "Il quartiere",
        title_en: "The district",
        text_it: "Un quartiere tranquillo di {city} nasconde più di quanto mostri.",
        text_en: "A quiet district of {city} hides more than it shows.",
    },
    ClueTemplate {
        key: "loc-medium-bearing",
        title_it: "La rotta",
        title_en: "The bearing",
        text_it: "Da {city}, la rotta giusta è questione di pochi chilometri.",
        text_en: "From {city}, the right bearing is a matter of a few kilometers.",
    },
    ClueTemplate {
        key: "loc-medium-ring",
        title_it: "Il perimetro",
        title_en: "The perimeter",
        text_it: "Traccia un cerchio attorno a {city}: il premio non ne esce.",
        text_en: "Draw a circle around {city}: the prize never leaves it.",
    },
];

const LOCATION_PRECISE: &[ClueTemplate] = &[
    ClueTemplate {
        key: "loc-precise-address",
        title_it: "L'indirizzo",
        title_en: "The address",
        text_it: "Qualcuno ha scritto {address} su un biglietto. Non perderlo.",
        text_en: "Someone wrote {address} on a note. Don't lose it.",
    },
    ClueTemplate {
        key: "loc-precise-coords",
        title_it: "Le coordinate",
        title_en: "The coordinates",
        text_it: "{lat}, {lng}: numeri che valgono più di mille parole.",
        text_en: "{lat}, {lng}: numbers worth more than a thousand words.",
    },
    ClueTemplate {
        key: "loc-precise-street",
        title_it: "La strada",
        title_en: "The street",
        text_it: "La strada che cerchi passa per {address}, {city}.",
        text_en: "The street you are looking for runs through {address}, {city}.",
    },
    ClueTemplate {
        key: "loc-precise-latitude",
        title_it: "La latitudine",
        title_en: "The latitude",
        text_it: "Fermati quando la latitudine segna {lat}.",
        text_en: "Stop when the latitude reads {lat}.",
    },
    ClueTemplate {
        key: "loc-precise-few-steps",
        title_it: "Pochi passi",
        title_en: "A few steps",
        text_it: "Da {address} bastano pochi passi.",
        text_en: "From {address}, a few steps are enough.",
    },
];

const PRIZE_VAGUE: &[ClueTemplate] = &[
    ClueTemplate {
        key: "prize-vague-four-wheels",
        title_it: "Quattro ruote",
        title_en: "Four wheels",
        text_it: "Quattro ruote, un sogno: il resto devi scoprirlo tu.",
        text_en: "Four wheels and a dream: the rest is yours to discover.",
    },
    ClueTemplate {
        key: "prize-vague-keys",
        title_it: "Le chiavi",
        title_en: "The keys",
        text_it: "Un mazzo di chiavi aspetta una mano che lo meriti.",
        text_en: "A set of keys awaits a hand that deserves it.",
    },
    ClueTemplate {
        key: "prize-vague-heartbeat",
        title_it: "Il battito",
        title_en: "The heartbeat",
        text_it: "Il suo cuore batte solo quando gira la chiave.",
        text_en: "Its heart only beats when the key turns.",
    },
    ClueTemplate {
        key: "prize-vague-garage",
        title_it: "Al coperto",
        title_en: "Under cover",
        text_it: "Dorme al coperto, lucida come il primo giorno.",
        text_en: "It sleeps indoors, as polished as day one.",
    },
    ClueTemplate {
        key: "prize-vague-road",
        title_it: "Nata per la strada",
        title_en: "Born for the road",
        text_it: "Non è fatta per stare ferma.",
        text_en: "It was not built to stand still.",
    },
    ClueTemplate {
        key: "prize-vague-dream",
        title_it: "Un sogno",
        title_en: "A dream",
        text_it: "C'è chi la disegna sui quaderni e chi la vincerà.",
        text_en: "Some sketch it in notebooks; someone will win it.",
    },
];

const PRIZE_MEDIUM: &[ClueTemplate] = &[
    ClueTemplate {
        key: "prize-medium-leather",
        title_it: "Pelle e cuciture",
        title_en: "Leather and stitching",
        text_it: "Dentro, pelle cucita a mano. Fuori, una linea che non dimentichi.",
        text_en: "Hand-stitched leather inside; a silhouette you won't forget outside.",
    },
    ClueTemplate {
        key: "prize-medium-two-seats",
        title_it: "Due posti",
        title_en: "Two seats",
        text_it: "Due posti soltanto: uno è per te.",
        text_en: "Only two seats: one of them is yours.",
    },
    ClueTemplate {
        key: "prize-medium-coupe",
        title_it: "Una coupé",
        title_en: "A coupé",
        text_it: "Profilo basso, tetto che scende deciso: una coupé da manuale.",
        text_en: "Low profile, a roofline that drops sharply: a textbook coupé.",
    },
    ClueTemplate {
        key: "prize-medium-exhaust",
        title_it: "La voce",
        title_en: "The voice",
        text_it: "La riconosceresti a occhi chiusi, dal timbro dello scarico.",
        text_en: "You would recognize it with your eyes closed, by the note of its exhaust.",
    },
    ClueTemplate {
        key: "prize-medium-speed",
        title_it: "Oltre i 250",
        title_en: "Past 250",
        text_it: "Il tachimetro va ben oltre i 250.",
        text_en: "The speedometer reads well past 250.",
    },
];

const PRIZE_PRECISE: &[ClueTemplate] = &[
    ClueTemplate {
        key: "prize-precise-horsepower",
        title_it: "I cavalli",
        title_en: "The horses",
        text_it: "{horsepower} cavalli scalpitano sotto il cofano.",
        text_en: "{horsepower} horses stamp under the hood.",
    },
    ClueTemplate {
        key: "prize-precise-color",
        title_it: "La livrea",
        title_en: "The livery",
        text_it: "La sua livrea è {color}: la vedrai da lontano.",
        text_en: "Its livery is {color}: you will spot it from afar.",
    },
    ClueTemplate {
        key: "prize-precise-parked",
        title_it: "Custodita",
        title_en: "Kept safe",
        text_it: "È custodita a due passi da {address}.",
        text_en: "It is kept a stone's throw from {address}.",
    },
    ClueTemplate {
        key: "prize-precise-city",
        title_it: "La sua città",
        title_en: "Its city",
        text_it: "Respira l'aria di {city} da settimane, senza farsi notare.",
        text_en: "It has been breathing the air of {city} for weeks, unnoticed.",
    },
    ClueTemplate {
        key: "prize-precise-coords",
        title_it: "Numeri precisi",
        title_en: "Precise numbers",
        text_it: "Cerca vicino a {lat}, {lng}. Più vicino di così non si può.",
        text_en: "Search near {lat}, {lng}. It does not get closer than this.",
    },
    ClueTemplate {
        key: "prize-precise-plates",
        title_it: "Senza targa",
        title_en: "No plates",
        text_it: "Non ha ancora una targa: il primo viaggio sarà tuo.",
        text_en: "It has no plates yet: the first drive will be yours.",
    },
];

fn pool_for(week: u32, category: ClueCategory) -> &'static [ClueTemplate] {
    match (category, week) {
        (ClueCategory::Location, 0..=2) => LOCATION_VAGUE,
        (ClueCategory::Location, 3) => LOCATION_MEDIUM,
        (ClueCategory::Location, _) => LOCATION_PRECISE,
        (ClueCategory::Prize, 0..=2) => PRIZE_VAGUE,
        (ClueCategory::Prize, 3) => PRIZE_MEDIUM,
        (ClueCategory::Prize, _) => PRIZE_PRECISE,
    }
}

/// Number of candidates in the pool for a given week and category.
/// Exposed so callers can reason about pool exhaustion.
pub fn pool_size(week: u32, category: ClueCategory) -> usize {
    pool_for(week, category).len()
}

/// A template is renderable when every optional attribute it references
/// is present on the target. Required attributes (city, address,
/// coordinates) always render.
fn is_renderable(t: &ClueTemplate, target: &ActiveTarget) -> bool {
    (!t.text_it.contains("{horsepower}") || target.horsepower.is_some())
        && (!t.text_it.contains("{color}") || target.color.is_some())
}

fn render(text: &str, target: &ActiveTarget) -> String {
    let mut out = text.replace("{city}", &target.city);
    out = out.replace("{address}", &target.address);
    out = out.replace("{lat}", &format!("{:.3}", target.lat));
    out = out.replace("{lng}", &format!("{:.3}", target.lng));
    if let Some(hp) = target.horsepower {
        out = out.replace("{horsepower}", &hp.to_string());
    }
    if let Some(color) = &target.color {
        out = out.replace("{color}", color);
    }
    out
}

/// Pick a clue for (week, category), avoiding keys already in `used`
/// when possible. An exhausted pool falls back to repetition rather
/// than failing the action.
pub fn select_clue(
    week: u32,
    category: ClueCategory,
    target: &ActiveTarget,
    used: &HashSet<String>,
    rng: &mut impl Rng,
) -> SelectedClue {
    let renderable: Vec<&ClueTemplate> = pool_for(week, category)
        .iter()
        .filter(|t| is_renderable(t, target))
        .collect();

    let fresh: Vec<&ClueTemplate> = renderable
        .iter()
        .copied()
        .filter(|t| !used.contains(t.key))
        .collect();

    let candidates = if fresh.is_empty() { &renderable } else { &fresh };
    let chosen = candidates[rng.random_range(0..candidates.len())];

    SelectedClue {
        key: chosen.key.to_string(),
        title_it: chosen.title_it.to_string(),
        title_en: chosen.title_en.to_string(),
        description_it: render(chosen.text_it, target),
        description_en: render(chosen.text_en, target),
        is_misleading: rng.random_bool(MISLEADING_PROBABILITY),
    }
}
