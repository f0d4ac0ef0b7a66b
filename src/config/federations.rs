use crate::domain::Federation;

/// Federation site to scrape standings from
///
/// Every resource on a federation site lives under `{base_url}/{resource}/view/{id}`,
/// where the trailing id is only unique within that site.
#[derive(Debug, Clone)]
pub struct FederationConfig {
    pub federation: Federation,
    pub base_url: String,
    pub competition_path: String,
}

impl FederationConfig {
    pub fn new(federation: Federation, base_url: &str, competition_path: &str) -> Self {
        Self {
            federation,
            base_url: base_url.trim_end_matches('/').to_string(),
            competition_path: competition_path.to_string(),
        }
    }

    pub fn competition_url(&self) -> String {
        self.absolute(&self.competition_path)
    }

    /// Turn a site-relative href into a full URL; absolute hrefs pass through
    pub fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }

    pub fn team_url(&self, local_id: &str) -> String {
        self.resource_url("teams", local_id)
    }

    pub fn player_url(&self, local_id: &str) -> String {
        self.resource_url("players", local_id)
    }

    fn resource_url(&self, resource: &str, local_id: &str) -> String {
        format!("{}/{}/view/{}", self.base_url, resource, local_id)
    }
}

/// The two federations whose competitions the club plays in
pub fn get_federations() -> Vec<FederationConfig> {
    vec![
        FederationConfig::new(Federation::Knsb, "https://knsb.netstand.nl", "/scores/index/54"),
        FederationConfig::new(Federation::Nosbo, "https://nosbo.netstand.nl", "/scores/index/16"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_building() {
        let config = FederationConfig::new(Federation::Knsb, "https://knsb.netstand.nl/", "/scores/index/54");

        assert_eq!(config.competition_url(), "https://knsb.netstand.nl/scores/index/54");
        assert_eq!(config.absolute("/teams/view/12"), "https://knsb.netstand.nl/teams/view/12");
        assert_eq!(config.absolute("https://other.nl/x"), "https://other.nl/x");
        assert_eq!(config.player_url("77"), "https://knsb.netstand.nl/players/view/77");
    }
}
