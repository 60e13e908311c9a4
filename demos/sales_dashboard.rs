use chart_data_builder::{FilterSpec, GroupDimension, Session};

const REPORT: &str = "Weekly allocation export,,,,,\n\
                      Region,Branch,Backribs,Spareribs,Ham,Notes\n\
                      North,Main,\"1,000\",250,100,ok\n\
                      North,Side,500,125,50,\n\
                      South,Depot,200,n/a,75,late\n";

fn main() {
    let mut session = Session::new();
    session
        .ingest_text(REPORT)
        .expect("report should ingest cleanly");

    println!("Inferred roles: {:?}", session.roles());
    println!("Normalized records: {}", session.records().len());

    println!("\nTotals by product:");
    for group in session.aggregate() {
        println!("  {:<12} {:>10.1}", group.label, group.total);
    }

    println!("\nAreas available: {:?}", session.options(GroupDimension::Area));

    session.set_filters(FilterSpec {
        area: Some("North".to_string()),
        group_by: GroupDimension::Branch,
        ..FilterSpec::default()
    });

    println!("\nTotals by branch within North:");
    let totals = session.aggregate();
    if totals.is_empty() {
        println!("  (no matching records)");
    }
    for group in totals {
        println!("  {:<12} {:>10.1}", group.label, group.total);
    }
}
