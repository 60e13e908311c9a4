use anyhow::Result;
use chart_data_builder::{FilterSpec, GroupDimension, Session};

fn main() -> Result<()> {
    let mut session = Session::new();
    session.ingest_text(
        "Region,Branch,Product,Qty\n\
         North,Main,Widgets,10\n\
         North,Side,Gadgets,4\n\
         South,Main,Widgets,6\n",
    )?;
    session.set_filters(FilterSpec {
        product: Some("Widgets".to_string()),
        group_by: GroupDimension::Branch,
        ..FilterSpec::default()
    });

    let saved = session.to_json()?;
    println!("Serialized session: {} bytes", saved.len());

    let restored = Session::from_json(&saved)?;
    println!("Restored totals:");
    for group in restored.aggregate() {
        println!("  {:<10} {:>8.1}", group.label, group.total);
    }

    Ok(())
}
