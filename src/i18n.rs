use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use yuuka::derive_struct;

// Include translation TOML at compile time
const EN_US_TOML: &str = include_str!("../res/i18n/en_us.toml");

derive_struct! {
    #[derive(PartialEq, Serialize, Deserialize)]
    pub Lang {
        title: String = "title".to_string(),
        ports_title: String = "ports_title".to_string(),
        settings_title: String = "settings_title".to_string(),
        messages_title: String = "messages_title".to_string(),
        info_title: String = "info_title".to_string(),
        input_title: String = "input_title".to_string(),
        no_com_ports: String = "no_com_ports".to_string(),
        state_open: String = "state_open".to_string(),
        state_closed: String = "state_closed".to_string(),
        label_view: String = "label_view".to_string(),
        label_input: String = "label_input".to_string(),
        label_ending: String = "label_ending".to_string(),
        label_scanned: String = "label_scanned".to_string(),
        // info panel messages
        msg_no_ports: String = "msg_no_ports".to_string(),
        msg_ports_updated: String = "msg_ports_updated".to_string(),
        msg_port_not_found: String = "msg_port_not_found".to_string(),
        msg_port_opened: String = "msg_port_opened".to_string(),
        msg_open_failed: String = "msg_open_failed".to_string(),
        msg_already_open: String = "msg_already_open".to_string(),
        msg_port_closed: String = "msg_port_closed".to_string(),
        msg_nothing_open: String = "msg_nothing_open".to_string(),
        msg_send_not_open: String = "msg_send_not_open".to_string(),
        msg_bad_hex: String = "msg_bad_hex".to_string(),
        msg_config_applied: String = "msg_config_applied".to_string(),
        msg_config_failed: String = "msg_config_failed".to_string(),
        msg_port_lost: String = "msg_port_lost".to_string(),
        // bottom hints
        hint_main: String = "hint_main".to_string(),
        hint_input: String = "hint_input".to_string(),
    }
}

static LANG_SELECTED: OnceCell<Lang> = OnceCell::new();

fn parse_toml_to_lang(content: &str) -> Lang {
    match toml::from_str::<Lang>(content) {
        Ok(l) => l,
        Err(e) => {
            log::warn!(
                "i18n: failed to parse toml: {}\ncontent preview: {}",
                e,
                &content.chars().take(200).collect::<String>()
            );
            // Fallback: return the default Lang (keys as values)
            Lang::default()
        }
    }
}

/// Return a reference to the currently selected `Lang`.
/// Callers can access fields directly, e.g. `i18n::lang().title`.
pub fn lang() -> &'static Lang {
    LANG_SELECTED.get_or_init(|| parse_toml_to_lang(EN_US_TOML))
}

pub fn init_i18n() {
    let lang = lang();
    log::info!(
        "i18n: user={} locale=en_us title={}",
        whoami::username(),
        lang.title
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_strings_parse() {
        let parsed = parse_toml_to_lang(EN_US_TOML);
        assert_ne!(parsed, Lang::default());
        assert_eq!(parsed.title, "Serial Port Com");
        assert_eq!(lang().msg_no_ports, "No available com port found!");
    }
}
