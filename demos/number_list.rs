//! Number List Demo - cells, a derived sum, and incremental rerenders.
//!
//! Run with: cargo run --example number_list
//!
//! Logs at DEBUG so the host traces the render tree.

use std::rc::Rc;

use reflow::backends::SeqOutput;
use reflow::{Cell, Derived, RenderError, RootBlock, TraceHost, UserBlock, Value};

fn main() -> Result<(), RenderError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let output = SeqOutput::new();

    let first = Cell::new(10i64);
    let second = Cell::new(20i64);
    let third = Cell::new(30i64);
    let sum = {
        let (first, second, third) = (first.clone(), second.clone(), third.clone());
        Derived::new(move || first.get() + second.get() + third.get())
    };

    let program = {
        let (first, second, third, sum) =
            (first.clone(), second.clone(), third.clone(), sum.clone());
        UserBlock::new("number list", move |region| {
            region.atom(Value::from(first.clone()))?;
            region.atom(Value::from(second.clone()))?;
            region.atom(Value::from(third.clone()))?;
            region.atom(Value::from(sum.clone()))?;
            Ok(())
        })
    };

    let mut root = RootBlock::new(program, Rc::new(TraceHost::new()));
    root.render(output.range())?;
    println!("initial render: {:?}", output.snapshot());

    root.rerender()?;
    println!("no-op rerender: {:?}", output.snapshot());

    first.set(15);
    third.set(50);
    root.rerender()?;
    println!("after mutation: {:?}", output.snapshot());

    Ok(())
}
