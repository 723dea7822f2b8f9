use clap::Args;

use cartkit::configurator::Selections;

/// Sides are cleared with this value.
const NO_SIDE: &str = "none";

/// Selection flags shared by `add` and `edit`.
#[derive(Debug, Args)]
pub(super) struct SelectionArgs {
    /// Side to serve with the product, or `none`
    #[arg(long)]
    side: Option<String>,

    /// Extra as `id=quantity`; a quantity of 0 deselects it
    #[arg(long = "extra", value_name = "ID=QTY", value_parser = option_quantity)]
    extras: Vec<(String, u32)>,

    /// Sauce as `id=quantity`; a quantity of 0 deselects it
    #[arg(long = "sauce", value_name = "ID=QTY", value_parser = option_quantity)]
    sauces: Vec<(String, u32)>,

    /// Addon to include
    #[arg(long = "addon", value_name = "ID")]
    addons: Vec<String>,

    /// Addon to leave out
    #[arg(long = "without-addon", value_name = "ID")]
    without_addons: Vec<String>,

    /// Note for the kitchen
    #[arg(long)]
    note: Option<String>,
}

impl SelectionArgs {
    /// Layers the flags over existing selections.
    pub(super) fn apply(self, mut selections: Selections) -> Selections {
        if let Some(side) = &self.side {
            selections = selections.side(Some(side.as_str()).filter(|id| *id != NO_SIDE));
        }

        for (id, quantity) in self.extras {
            selections = selections.extra(id, quantity);
        }

        for (id, quantity) in self.sauces {
            selections = selections.sauce(id, quantity);
        }

        for id in self.addons {
            selections = selections.addon(id);
        }

        for id in &self.without_addons {
            selections = selections.without_addon(id);
        }

        if let Some(note) = self.note {
            selections = selections.observation(note);
        }

        selections
    }
}

fn option_quantity(value: &str) -> Result<(String, u32), String> {
    let (id, quantity) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=QTY, got `{value}`"))?;

    if id.is_empty() {
        return Err(format!("missing option id in `{value}`"));
    }

    let quantity = quantity
        .trim()
        .parse()
        .map_err(|error| format!("invalid quantity in `{value}`: {error}"))?;

    Ok((id.trim().to_string(), quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_option_quantity() {
        assert_eq!(option_quantity("bacon=2"), Ok(("bacon".to_string(), 2)));
        assert!(option_quantity("bacon").is_err());
        assert!(option_quantity("=2").is_err());
        assert!(option_quantity("bacon=-1").is_err());
    }
}
