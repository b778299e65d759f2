use colmean::{Evaluator, MeanAccumulator, Mode, Output, PartialState, TypeDescriptor};
use rand::{rngs::StdRng, Rng, SeedableRng};
use test_log::test;

const ROWS: [[f64; 4]; 4] = [
    [2.0, 4.0, 7.9, 2.0],
    [4.0, 2.0, 2.1, 8.0],
    [8.0, 8.0, 2.1, 4.0],
    [2.0, 2.0, 3.9, 2.0],
];

fn doubles(n: usize) -> Vec<TypeDescriptor> {
    vec![TypeDescriptor::Double; n]
}

fn rows() -> Vec<[Option<f64>; 4]> {
    ROWS.iter().map(|row| row.map(Some)).collect()
}

fn assert_means(expected: &[f64], output: Output) {
    let Output::Final(means) = output else {
        panic!("expected final output, got {output:?}");
    };

    assert_eq!(expected.len(), means.len());

    for (a, b) in expected.iter().zip(&means) {
        assert!((a - b).abs() < 1e-9, "{expected:?} != {means:?}");
    }
}

fn partial(output: Output) -> PartialState {
    match output {
        Output::Partial(partial) => partial,
        Output::Final(means) => panic!("expected partial output, got {means:?}"),
    }
}

#[test]
fn row_to_final() -> colmean::Result<()> {
    let evaluator = Evaluator::builder()
        .mode(Mode::Complete)
        .build(&doubles(4))?;

    assert_means(&[4.0; 4], evaluator.process_rows(rows())?);

    Ok(())
}

#[test]
fn row_to_partial() -> colmean::Result<()> {
    let evaluator = Evaluator::builder()
        .mode(Mode::Partial1)
        .build(&doubles(4))?;

    let state = partial(evaluator.process_rows(rows())?);
    assert_eq!(4, state.count());
    assert_eq!(5, state.to_wire().len());

    for sum in state.sums() {
        assert!((sum - 16.0).abs() < 1e-9);
    }

    Ok(())
}

#[test]
fn partial_to_partial_to_final() -> colmean::Result<()> {
    let types = doubles(4);

    let map = Evaluator::builder().mode(Mode::Partial1).build(&types)?;
    let combine = Evaluator::builder().mode(Mode::Partial2).build(&types)?;
    let reduce = Evaluator::builder().mode(Mode::Final).build(&types)?;

    let all = rows();
    let (left, right) = all.split_at(1);

    let left = partial(map.process_rows(left)?);
    let right = partial(map.process_rows(right)?);

    // NOTE: Combiner step in between
    let combined = partial(combine.process_partials([left, right])?);
    assert_eq!(4, combined.count());

    assert_means(&[4.0; 4], reduce.process_partials([combined])?);

    Ok(())
}

#[test]
fn merge_is_order_independent() -> colmean::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);

    let rows = (0..500)
        .map(|_| {
            [
                Some(rng.gen_range(-1_000.0..1_000.0)),
                rng.gen_bool(0.8).then(|| rng.gen_range(0.0..1.0)),
                Some(f64::from(rng.gen_range(-100_i32..100))),
            ]
        })
        .collect::<Vec<_>>();

    let complete = Evaluator::builder().build(&doubles(3))?;
    let Output::Final(expected) = complete.process_rows(&rows)? else {
        panic!("expected final output");
    };

    let map = Evaluator::builder().mode(Mode::Partial1).build(&doubles(3))?;
    let reduce = Evaluator::builder().mode(Mode::Final).build(&doubles(3))?;

    for _ in 0..20 {
        // Random partitioning into a random number of workers
        let workers = rng.gen_range(1..8);
        let mut shares = vec![vec![]; workers];

        for row in &rows {
            shares[rng.gen_range(0..workers)].push(*row);
        }

        let mut partials = shares
            .iter()
            .map(|share| Ok(partial(map.process_rows(share)?)))
            .collect::<colmean::Result<Vec<_>>>()?;

        // Merge in reverse order of production
        partials.reverse();

        assert_means(&expected, reduce.process_partials(partials)?);
    }

    Ok(())
}

#[test]
fn empty_partial_is_identity() -> colmean::Result<()> {
    let mut accu = MeanAccumulator::new(4);
    for row in rows() {
        accu.accumulate(&row)?;
    }
    let before = accu.snapshot()?;

    let empty = MeanAccumulator::new(4);
    accu.merge(Some(&empty.snapshot()?))?;

    assert_eq!(before, accu.snapshot()?);

    Ok(())
}

#[test]
fn int_columns() -> colmean::Result<()> {
    let types = [TypeDescriptor::Int, TypeDescriptor::Int];
    let evaluator = Evaluator::builder().build(&types)?;

    assert_means(
        &[2.0, 1.0],
        evaluator.process_rows([[Some(1), Some(2)], [Some(3), None]])?,
    );

    Ok(())
}

#[test]
fn partials_survive_the_wire() -> colmean::Result<()> {
    let map = Evaluator::builder().mode(Mode::Partial1).build(&doubles(4))?;
    let reduce = Evaluator::builder().mode(Mode::Final).build(&doubles(4))?;

    let mut buffer = reduce.new_buffer();

    for row in rows() {
        let bytes = partial(map.process_rows([row])?).to_bytes();
        let state = PartialState::decode_from(&mut &bytes[..])?;
        reduce.merge(&mut buffer, Some(&state))?;
    }

    // NOTE: Missing partials are skipped
    reduce.merge(&mut buffer, None)?;

    assert_means(&[4.0; 4], reduce.terminate(&buffer)?);

    Ok(())
}
