use cytotox::core::models::layout::PlateLayout;

pub struct DefaultsConfig {
    pub steps: usize,
    pub layout: PlateLayout,
    pub log_scale: bool,
    pub round_digits: Option<u32>,
    pub drop_controls: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            steps: 8,
            layout: PlateLayout::ReplicateMajor,
            log_scale: true,
            round_digits: None,
            drop_controls: true,
        }
    }
}
