use anyhow::bail;
use gvnet_core::query;

use crate::terminal::{network_fmt, print};

pub fn find(name: Option<String>, address: Option<String>) -> anyhow::Result<()> {
    let (found, wanted) = match (name, address) {
        (Some(name), _) => (query::find_interface_by_name(&name), name),
        (None, Some(address)) => (query::find_interface_by_address(&address), address),
        (None, None) => bail!("either --name or --address is required"),
    };

    match found {
        Some(interface) => {
            network_fmt::print_interface(&interface, 0);
            Ok(())
        }
        None => {
            print::no_results("matching interface");
            bail!("no usable interface matches {wanted:?}")
        }
    }
}
