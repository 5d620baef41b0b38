use std::cell::RefCell;
use std::rc::Rc;

use flowex_core::{Builder, Tracer, ValueSlot};
use flowex_trace::{CollectingTracer, TraceEvent};

#[test]
fn builder_trace_bindings_reach_the_collecting_tracer() {
    let tracer = Rc::new(RefCell::new(CollectingTracer::new()));
    let handle: Rc<RefCell<dyn Tracer>> = tracer.clone();

    let mut builder = Builder::<i32>::with_tracer_handle(handle);
    builder.trace(2, "starting");
    builder
        .op(|ctx: &mut i32, slot: &mut ValueSlot| slot.set(*ctx > 0, *ctx))
        .trace_op_with_value("positive");
    let root = builder.build();

    assert!(root.run(&mut 5));

    assert_eq!(
        tracer.borrow().events(),
        &[
            TraceEvent::Message { level: 2, text: "starting".to_string() },
            TraceEvent::OperatorWithValue {
                label: "positive".to_string(),
                passed: true,
                had_value: true,
            },
        ]
    );
}
