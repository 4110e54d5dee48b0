//! List-of-numbers scenarios: render a few cells and a derived sum into a
//! sequence output, then rerender after mutations.

use std::rc::Rc;

use reflow::backends::SeqOutput;
use reflow::{Cell, Derived, NoopHost, RenderError, RootBlock, UserBlock, Value};

#[test]
fn test_simple_number_list() {
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

    let mut root = RootBlock::new(program, Rc::new(NoopHost));
    root.render(output.range()).unwrap();
    assert_eq!(output.snapshot(), vec![10, 20, 30, 60]);

    // No-op rerender: no inputs changed, output identical, any number of
    // times.
    root.rerender().unwrap();
    root.rerender().unwrap();
    assert_eq!(output.snapshot(), vec![10, 20, 30, 60]);

    // Mutate two of the three cells; the unmutated atom keeps its value.
    first.set(15);
    third.set(50);
    root.rerender().unwrap();
    assert_eq!(output.snapshot(), vec![15, 20, 50, 85]);
}

#[test]
fn test_update_locality() {
    let output = SeqOutput::new();

    let left = Cell::new(1i64);
    let right = Cell::new(2i64);
    let evals = Rc::new(std::cell::Cell::new(0usize));

    // Derived that only reads `right`, counting evaluations.
    let counted = {
        let right = right.clone();
        let evals = evals.clone();
        Derived::new(move || {
            evals.set(evals.get() + 1);
            right.get()
        })
    };

    let program = {
        let (left, counted) = (left.clone(), counted.clone());
        UserBlock::new("locality", move |region| {
            region.atom(Value::from(left.clone()))?;
            region.atom(Value::from(counted.clone()))?;
            Ok(())
        })
    };

    let mut root = RootBlock::new(program, Rc::new(NoopHost));
    root.render(output.range()).unwrap();
    assert_eq!(output.snapshot(), vec![1, 2]);
    assert_eq!(evals.get(), 1);

    // Mutating `left` must not re-run the counted derived.
    left.set(7);
    root.rerender().unwrap();
    assert_eq!(output.snapshot(), vec![7, 2]);
    assert_eq!(evals.get(), 1);

    // Mutating `right` re-runs it exactly once.
    right.set(9);
    root.rerender().unwrap();
    assert_eq!(output.snapshot(), vec![7, 9]);
    assert_eq!(evals.get(), 2);
}

#[test]
fn test_const_program_retains_no_updater() {
    let output = SeqOutput::new();

    let program = UserBlock::new("constants", |region| {
        region.atom(Value::constant(1i64))?;
        region.atom(Value::constant(2i64))?;
        Ok(())
    });

    let mut root = RootBlock::new(program, Rc::new(NoopHost));
    root.render(output.range()).unwrap();
    assert_eq!(output.snapshot(), vec![1, 2]);

    // No retained updater means rerender cannot touch the medium.
    assert!(root.is_const());
    root.rerender().unwrap();
    assert!(root.is_const());
    assert_eq!(output.snapshot(), vec![1, 2]);
}

#[test]
fn test_user_error_propagates_and_leaves_partial_output() {
    let output = SeqOutput::new();

    let program = UserBlock::new("failing", |region| {
        region.atom(Value::constant(1i64))?;
        Err(RenderError::message("boom"))
    });

    let mut root = RootBlock::new(program, Rc::new(NoopHost));
    let err = root.render(output.range()).unwrap_err();
    assert_eq!(err.to_string(), "boom");

    // No rollback: the atom appended before the failure stays.
    assert_eq!(output.snapshot(), vec![1]);
}
