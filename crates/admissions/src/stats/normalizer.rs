// Filler words the source appends to track titles ("competition-rate status"
// and "track"). Longest first so the shorter token never splits the longer one.
const FILLER_TOKENS: [&str; 2] = ["경쟁률현황", "전형"];

pub(crate) fn normalize_track_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let compact: String = cleaned.split_whitespace().collect();
    FILLER_TOKENS
        .iter()
        .fold(compact, |name, token| name.replace(token, ""))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackAlias {
    General,
    GeneralHighSchool,
    SpecializedHighSchool,
}

fn alias_for(normalized: &str) -> Option<TrackAlias> {
    match normalized {
        "general" | "일반" => Some(TrackAlias::General),
        "general-high-school" | "일반고" => Some(TrackAlias::GeneralHighSchool),
        "specialized-high-school" | "특성화고" => Some(TrackAlias::SpecializedHighSchool),
        _ => None,
    }
}

/// Whether a current-period track and a prior-period track describe the same
/// program. The general track was renamed between periods, so it pairs with
/// the general-high-school track in either direction.
pub(crate) fn tracks_correspond(current: &str, prior: &str) -> bool {
    let current = normalize_track_name(current);
    let prior = normalize_track_name(prior);

    match (alias_for(&current), alias_for(&prior)) {
        (Some(TrackAlias::General), Some(TrackAlias::GeneralHighSchool))
        | (Some(TrackAlias::GeneralHighSchool), Some(TrackAlias::General))
        | (Some(TrackAlias::SpecializedHighSchool), Some(TrackAlias::SpecializedHighSchool)) => {
            true
        }
        _ => current == prior,
    }
}

/// Special-track detection used when ingesting source rows.
pub(crate) fn is_special_track(value: &str) -> bool {
    let normalized = normalize_track_name(value);
    normalized.eq_ignore_ascii_case("special") || normalized.contains("특별")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_whitespace_and_filler_tokens() {
        assert_eq!(normalize_track_name("\u{feff}일반 전형 경쟁률 현황"), "일반");
        assert_eq!(normalize_track_name(" 특성화고 전형 "), "특성화고");
        assert_eq!(normalize_track_name("general"), "general");
    }

    #[test]
    fn general_pairs_with_general_high_school_both_ways() {
        assert!(tracks_correspond("general", "general-high-school"));
        assert!(tracks_correspond("general-high-school", "general"));
        assert!(tracks_correspond("일반전형", "일반고 전형 경쟁률현황"));
        assert!(tracks_correspond("특성화고전형", "특성화고 전형"));
    }

    #[test]
    fn unrelated_tracks_fall_back_to_exact_equality() {
        assert!(tracks_correspond("수시 1차", "수시1차"));
        assert!(!tracks_correspond("general", "specialized-high-school"));
        assert!(!tracks_correspond("수시 1차", "수시 2차"));
    }

    #[test]
    fn special_track_detection() {
        assert!(is_special_track("special"));
        assert!(is_special_track("정원외 특별전형"));
        assert!(!is_special_track("specialized-high-school"));
        assert!(!is_special_track("general"));
    }
}
