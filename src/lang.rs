/*! Language code handling.

All labels inside the pipeline are lowercase two-letter codes where one
exists. Backends emitting ISO 639-3 labels (whatlang, whichlang) go through
[normalize]; unknown codes are kept verbatim so that rare languages survive
up to the decision stage.
!*/
use std::collections::HashSet;

use lazy_static::lazy_static;

/// Label emitted when no decision can be reached.
pub const UND: &str = "und";

lazy_static! {
    /// The full inventory of the impresso fasttext model.
    pub static ref IMPRESSO_FT_LANGS: HashSet<&'static str> =
        ["fr", "de", "lb", "en", "it"].into_iter().collect();
}

/// Map an ISO 639-3 code onto its two-letter equivalent.
///
/// Covers the inventories of the whatlang and whichlang backends; anything
/// else (already-two-letter codes included) is passed through lowercased.
pub fn normalize(code: &str) -> String {
    let code = code.to_lowercase();
    let short = match code.as_str() {
        "afr" => "af",
        "aka" => "ak",
        "amh" => "am",
        "ara" => "ar",
        "aze" | "azj" => "az",
        "bel" => "be",
        "ben" => "bn",
        "bul" => "bg",
        "cat" => "ca",
        "ces" => "cs",
        "cmn" | "zho" => "zh",
        "dan" => "da",
        "deu" => "de",
        "ell" => "el",
        "eng" => "en",
        "epo" => "eo",
        "est" => "et",
        "fin" => "fi",
        "fra" => "fr",
        "guj" => "gu",
        "heb" => "he",
        "hin" => "hi",
        "hrv" => "hr",
        "hun" => "hu",
        "hye" => "hy",
        "ind" => "id",
        "ita" => "it",
        "jav" => "jv",
        "jpn" => "ja",
        "kan" => "kn",
        "kat" => "ka",
        "khm" => "km",
        "kor" => "ko",
        "lat" => "la",
        "lav" => "lv",
        "lit" => "lt",
        "ltz" => "lb",
        "mal" => "ml",
        "mar" => "mr",
        "mkd" => "mk",
        "mya" => "my",
        "nep" => "ne",
        "nld" => "nl",
        "nob" | "nor" => "no",
        "ori" => "or",
        "pan" => "pa",
        "pes" | "fas" => "fa",
        "pol" => "pl",
        "por" => "pt",
        "ron" => "ro",
        "rus" => "ru",
        "sin" => "si",
        "slk" => "sk",
        "slv" => "sl",
        "sna" => "sn",
        "som" => "so",
        "spa" => "es",
        "srp" => "sr",
        "swe" => "sv",
        "tam" => "ta",
        "tel" => "te",
        "tgl" => "tl",
        "tha" => "th",
        "tuk" => "tk",
        "tur" => "tr",
        "ukr" => "uk",
        "urd" => "ur",
        "uzb" => "uz",
        "vie" => "vi",
        "yid" => "yi",
        "yor" => "yo",
        "zul" => "zu",
        _ => return code,
    };
    short.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_letter_codes_shorten() {
        assert_eq!(normalize("deu"), "de");
        assert_eq!(normalize("fra"), "fr");
        assert_eq!(normalize("ltz"), "lb");
        assert_eq!(normalize("LAT"), "la");
    }

    #[test]
    fn short_and_unknown_codes_pass_through() {
        assert_eq!(normalize("de"), "de");
        assert_eq!(normalize("Lb"), "lb");
        // an inventory we do not map stays intact rather than being dropped
        assert_eq!(normalize("xzy"), "xzy");
    }

    #[test]
    fn impresso_ft_inventory() {
        assert!(IMPRESSO_FT_LANGS.contains("lb"));
        assert!(!IMPRESSO_FT_LANGS.contains("la"));
        assert_eq!(IMPRESSO_FT_LANGS.len(), 5);
    }
}
