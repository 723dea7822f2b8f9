use std::io::Write;

use cartkit::{config::CartConfig, pricing::to_money, products::OptionKind};

use super::CliError;

const GROUPS: [(OptionKind, &str); 4] = [
    (OptionKind::Extra, "extras"),
    (OptionKind::Side, "sides"),
    (OptionKind::Sauce, "sauces"),
    (OptionKind::Addon, "addons"),
];

pub(super) fn run(config: &CartConfig, out: &mut impl Write) -> Result<(), CliError> {
    let catalog = config.load_catalog()?;
    let currency = catalog.currency()?;

    for product in catalog.products() {
        writeln!(
            out,
            "{:<16} {:<24} {}",
            product.id,
            product.name,
            to_money(product.price, currency)?
        )?;

        for (kind, label) in GROUPS {
            for option in product.options(kind) {
                writeln!(
                    out,
                    "  {label:<8} {:<14} {:<22} +{}",
                    option.id,
                    option.name,
                    to_money(option.price, currency)?
                )?;
            }
        }
    }

    Ok(())
}
