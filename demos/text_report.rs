//! Text Report Demo - a line-oriented document with a reactive row.
//!
//! Run with: cargo run --example text_report
//!
//! The title line refreshes in place when its cell changes; the totals row
//! lives inside a dynamic block and is torn down and re-folded whenever any
//! of its numbers change.

use std::rc::Rc;

use reflow::backends::{RowAdapter, TextOutput};
use reflow::{Block, Cell, Derived, RenderError, RootBlock, TraceHost, UserBlock, Value};

fn main() -> Result<(), RenderError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let output = TextOutput::new();

    let title = Cell::new("quarterly totals".to_string());
    let q1 = Cell::new(10i64);
    let q2 = Cell::new(20i64);
    let q3 = Cell::new(30i64);
    let total = {
        let (q1, q2, q3) = (q1.clone(), q2.clone(), q3.clone());
        Derived::new(move || q1.get() + q2.get() + q3.get())
    };

    let program = {
        let title = title.clone();
        let (q1, q2, q3, total) = (q1.clone(), q2.clone(), q3.clone(), total.clone());
        UserBlock::new("report", move |region| {
            region.atom(Value::from(title.clone()))?;

            let totals_row = {
                let (q1, q2, q3, total) = (q1.clone(), q2.clone(), q3.clone(), total.clone());
                UserBlock::new("totals row", move |region| {
                    let mut row = region.open(&RowAdapter);
                    row.atom(Value::from(q1.clone()))?;
                    row.atom(Value::from(q2.clone()))?;
                    row.atom(Value::from(q3.clone()))?;
                    row.atom(Value::from(total.clone()))?;
                    region.flush(&RowAdapter, row);
                    Ok(())
                })
            };
            region.render_block(&Block::dynamic(totals_row))?;

            region.atom(Value::constant("end of report".to_string()))?;
            Ok(())
        })
    };

    let mut root = RootBlock::new(program, Rc::new(TraceHost::new()));
    root.render(output.range())?;
    println!("--- initial render ---\n{}", output.render());

    title.set("quarterly totals (revised)".to_string());
    root.rerender()?;
    println!("--- after title change ---\n{}", output.render());

    q2.set(25);
    root.rerender()?;
    println!("--- after q2 change ---\n{}", output.render());

    Ok(())
}
