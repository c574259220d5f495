use crate::api::MenuItem;
use crate::order::{
    is_main_category, LineKind, OrderLine, OrderMenu, Rejection, CHOOSE_ONE, DEFAULT_MIX_SIZE,
    MIX_SIZES,
};

/// The line being put together, before it goes into the cart
///
/// Fields are public so a draft can be inspected or rebuilt directly, but
/// [`reduce`] is the way to move it forward: it knows which selections a
/// change invalidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineDraft {
    /// Lowercased category name
    pub category: Option<String>,
    pub item: Option<MenuItem>,
    pub size: Option<String>,
    pub specials: Vec<String>,
    pub side: Option<String>,
    pub veg: Option<String>,
    pub gravey: Option<String>,
    /// Present while mix mode is on
    pub mix: Option<MixDraft>,
}

/// Second half of a mix meal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixDraft {
    pub second_main: Option<MenuItem>,
    pub second_main_specials: Vec<String>,
}

/// How far along a draft is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NoCategory,
    CategorySelected,
    ItemSelected,
    SizeSelected,
}

/// Which item of the line a specials change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Primary,
    SecondMain,
}

/// Everything a customer can do to a draft
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectCategory(String),
    SelectItem(String),
    SelectSize(String),
    SetSpecial {
        target: Target,
        special: String,
        checked: bool,
    },
    SelectSide(String),
    SelectVeg(String),
    SelectGravey(String),
    SetMix(bool),
    SelectSecondMain(String),
}

impl LineDraft {
    pub fn stage(&self) -> Stage {
        match (&self.category, &self.item, &self.size) {
            (None, None, _) => Stage::NoCategory,
            (_, None, _) => Stage::CategorySelected,
            (_, Some(_), None) => Stage::ItemSelected,
            (_, Some(_), Some(_)) => Stage::SizeSelected,
        }
    }

    fn in_main_category(&self) -> bool {
        self.category.as_deref().is_some_and(is_main_category)
    }

    /// Mix mode only counts within a main category
    pub fn is_mix(&self) -> bool {
        self.mix.is_some() && self.in_main_category()
    }

    /// Sizes that can be picked right now
    pub fn size_options(&self) -> Vec<String> {
        if self.is_mix() {
            return MIX_SIZES.iter().map(|s| s.to_string()).collect();
        }
        self.item
            .as_ref()
            .map(|item| item.prices.sizes().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Turn the draft into an order line, if it is complete
    pub fn commit(&self) -> Result<OrderLine, Rejection> {
        let (Some(item), Some(size)) = (&self.item, &self.size) else {
            return Err(Rejection::MissingSelection);
        };

        let kind = match &self.mix {
            Some(mix) if self.in_main_category() => {
                let second_main = mix.second_main.clone().ok_or(Rejection::MissingSecondMain)?;
                if !MIX_SIZES.contains(&size.as_str()) {
                    return Err(Rejection::InvalidMixSize);
                }
                LineKind::Mix {
                    second_main,
                    second_main_specials: mix.second_main_specials.clone(),
                }
            }
            _ => LineKind::Simple,
        };

        Ok(OrderLine {
            item: item.clone(),
            size: size.clone(),
            specials: self.specials.clone(),
            side: self.side.clone(),
            veg: self.veg.clone(),
            gravey: self.gravey.clone(),
            kind,
        })
    }
}

/// Apply an action to a draft, returning the next draft.
///
/// A rejected action leaves the caller's draft as it was. Picking a category
/// starts over; picking an item clears its size, specials, side, veg, gravy
/// and mix state.
pub fn reduce(draft: &LineDraft, action: Action, menu: &OrderMenu) -> Result<LineDraft, Rejection> {
    match action {
        Action::SelectCategory(name) => {
            let category = menu
                .category(&name)
                .ok_or(Rejection::UnknownCategory(name.clone()))?;
            Ok(LineDraft {
                category: Some(category.to_string()),
                ..LineDraft::default()
            })
        }

        Action::SelectItem(name) => {
            let item = match &draft.category {
                Some(category) => menu.items_in(category).iter().find(|i| i.name == name),
                None => menu.find(&name),
            }
            .ok_or(Rejection::UnknownItem(name.clone()))?;

            Ok(LineDraft {
                category: Some(item.category.to_lowercase()),
                item: Some(item.clone()),
                ..LineDraft::default()
            })
        }

        Action::SelectSize(size) => {
            require_item(draft)?;
            if !draft.size_options().contains(&size) {
                return Err(Rejection::UnknownSize(size));
            }
            Ok(LineDraft {
                size: Some(size),
                ..draft.clone()
            })
        }

        Action::SetSpecial {
            target,
            special,
            checked,
        } => {
            let mut next = draft.clone();
            match target {
                Target::Primary => {
                    let item = require_item(draft)?;
                    next.specials = toggle_special(item, &draft.specials, &special, checked)?;
                }
                Target::SecondMain => {
                    let mix = next.mix.as_mut().ok_or(Rejection::MixNotEnabled)?;
                    let second = mix.second_main.as_ref().ok_or(Rejection::NoSecondMain)?;
                    mix.second_main_specials =
                        toggle_special(second, &mix.second_main_specials, &special, checked)?;
                }
            }
            Ok(next)
        }

        Action::SelectSide(side) => {
            let item = require_item(draft)?;
            Ok(LineDraft {
                side: Some(pick_option(&item.sides, side)?),
                ..draft.clone()
            })
        }

        Action::SelectVeg(veg) => {
            let item = require_item(draft)?;
            Ok(LineDraft {
                veg: Some(pick_option(&item.veg, veg)?),
                ..draft.clone()
            })
        }

        Action::SelectGravey(gravey) => {
            let item = require_item(draft)?;
            Ok(LineDraft {
                gravey: Some(pick_option(&item.gravey, gravey)?),
                ..draft.clone()
            })
        }

        Action::SetMix(false) => Ok(LineDraft {
            mix: None,
            ..draft.clone()
        }),

        Action::SetMix(true) => {
            if draft.category.is_none() {
                return Err(Rejection::NoCategory);
            }
            if !draft.in_main_category() {
                return Err(Rejection::MixNotAvailable);
            }
            let size = match &draft.size {
                Some(size) if !MIX_SIZES.contains(&size.as_str()) => {
                    Some(DEFAULT_MIX_SIZE.to_string())
                }
                size => size.clone(),
            };
            Ok(LineDraft {
                size,
                mix: Some(MixDraft::default()),
                ..draft.clone()
            })
        }

        Action::SelectSecondMain(name) => {
            if draft.mix.is_none() {
                return Err(Rejection::MixNotEnabled);
            }
            let first = require_item(draft)?;
            if first.name == name {
                return Err(Rejection::SameSecondMain(name));
            }
            let second = menu
                .main_items()
                .find(|i| i.name == name)
                .ok_or(Rejection::UnknownItem(name.clone()))?;
            Ok(LineDraft {
                mix: Some(MixDraft {
                    second_main: Some(second.clone()),
                    second_main_specials: vec![],
                }),
                ..draft.clone()
            })
        }
    }
}

fn require_item(draft: &LineDraft) -> Result<&MenuItem, Rejection> {
    draft.item.as_ref().ok_or(Rejection::NoItem)
}

fn pick_option(options: &[String], choice: String) -> Result<String, Rejection> {
    if options.contains(&choice) {
        Ok(choice)
    } else {
        Err(Rejection::UnknownOption(choice))
    }
}

/// Check or uncheck a special of `item`, given the current selection.
///
/// Checking under "choose one" replaces the selection. The cap applies to
/// the selection after that. Unchecking always succeeds.
pub fn toggle_special(
    item: &MenuItem,
    selected: &[String],
    special: &str,
    checked: bool,
) -> Result<Vec<String>, Rejection> {
    let mut next = selected.to_vec();
    if !checked {
        next.retain(|s| s != special);
        return Ok(next);
    }

    if !item.specials.iter().any(|s| s == special) {
        return Err(Rejection::UnknownOption(special.to_string()));
    }
    if item.special_option.trim().eq_ignore_ascii_case(CHOOSE_ONE) {
        next.clear();
    }
    if next.iter().any(|s| s == special) {
        return Ok(next);
    }
    if let Some(cap) = item.special_cap {
        if next.len() >= cap as usize {
            return Err(Rejection::SpecialLimit(cap));
        }
    }
    next.push(special.to_string());
    Ok(next)
}
