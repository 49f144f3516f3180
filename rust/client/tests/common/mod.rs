use gymnasium::*;

pub const SERVER_URL: &str = "http://127.0.0.1:40004";

#[allow(dead_code)]
pub fn discrete_value(space: &ObsActSpace) -> Discrete {
    match space {
        ObsActSpace::Discrete { n } => *n,
        _ => panic!("{space:?} is not ObsActSpace::Discrete."),
    }
}

#[allow(dead_code)]
pub fn discrete_item_value(item: &ObsActSpaceItem) -> Discrete {
    item.discrete_value()
        .unwrap_or_else(|| panic!("{item:?} is not ObsActSpaceItem::Discrete."))
}
