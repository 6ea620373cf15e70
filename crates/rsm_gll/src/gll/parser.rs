//! GLL step function and driver loops

use super::gss::GssNodeId;
use super::recovery::recovery_edges;
use super::state::GllState;
use super::worklist::{Descriptor, Pool};
use super::{GllConfig, ParseStatus};
use crate::input::{InputGraph, Vertex};
use crate::rsm::{NonterminalId, Rsm, RsmStateId, Terminal};
use crate::sppf::{Sppf, SppfNodeId, SppfNodeKind, Weight};
use tracing::{Level, event};

/// Parsing context grouping the read-only inputs of a run
struct ParsingContext<'a, G: InputGraph> {
    rsm: &'a Rsm,
    input: &'a G,
    config: &'a GllConfig,
}

/// Parse `input` from its start vertices, continuing any earlier run on the
/// same state
pub fn parse<G: InputGraph>(
    rsm: &Rsm,
    input: &G,
    config: &GllConfig,
    state: &mut GllState<G::Vertex>,
) -> ParseStatus {
    let ctx = ParsingContext { rsm, input, config };
    event!(
        Level::DEBUG,
        "gll: parse started, start vertices={:?}, recovery={:?}",
        input.start_vertices(),
        config.recovery
    );
    seed(&ctx, state);
    run(&ctx, state)
}

/// Resume after the outgoing edges of `vertex` were edited
pub fn parse_from<G: InputGraph>(
    rsm: &Rsm,
    input: &G,
    config: &GllConfig,
    state: &mut GllState<G::Vertex>,
    vertex: G::Vertex,
) -> ParseStatus {
    let ctx = ParsingContext { rsm, input, config };

    let evicted = state.sppf.invalidate(vertex);
    if evicted > 0 {
        let sppf = &state.sppf;
        state.gss.retain_sppf(|id| sppf.is_alive(id));
        state
            .worklist
            .retain(|descriptor| descriptor.sppf.is_none_or(|id| sppf.is_alive(id)));
    }

    let rearmed = state.worklist.take_handled_at(vertex);
    event!(
        Level::DEBUG,
        "gll: resuming at {vertex:?}, evicted {evicted} forest nodes, re-armed {} descriptors",
        rearmed.len()
    );
    // A surviving root stays a candidate; cheaper pending work may still beat it
    state.result = state
        .result
        .filter(|&root| state.sppf.is_alive(root) && is_accepting(&ctx, &state.sppf, root));
    for descriptor in rearmed {
        add_descriptor(&ctx, state, descriptor);
    }
    seed(&ctx, state);
    run(&ctx, state)
}

fn seed<G: InputGraph>(ctx: &ParsingContext<'_, G>, state: &mut GllState<G::Vertex>) {
    let start_state = ctx.rsm.start_state();
    let start_nonterminal = ctx.rsm.start_nonterminal();
    for vertex in ctx.input.start_vertices() {
        let gss = state.gss.get_or_create(start_nonterminal, vertex, 0);
        add_descriptor(ctx, state, Descriptor::new(start_state, gss, None, vertex));
    }
}

/// Drain the default pool, then the recovery pool until a parse is accepted
fn run<G: InputGraph>(ctx: &ParsingContext<'_, G>, state: &mut GllState<G::Vertex>) -> ParseStatus {
    let mut processed = 0usize;
    let budget_spent = |processed: usize| {
        ctx.config
            .descriptor_budget
            .is_some_and(|budget| processed >= budget)
    };

    loop {
        if budget_spent(processed) {
            return finish(ctx, state, Some(ParseStatus::BudgetExhausted));
        }
        let Some(descriptor) = state.worklist.next_default() else {
            break;
        };
        if requeue_if_heavier(state, descriptor, 0) {
            continue;
        }
        processed += 1;
        state.stats.default_descriptors += 1;
        step(ctx, state, descriptor);
    }

    if ctx.config.recovery.is_enabled() {
        while may_improve(state) {
            if budget_spent(processed) {
                return finish(ctx, state, Some(ParseStatus::BudgetExhausted));
            }
            let Some((descriptor, pool)) = state.worklist.next() else {
                break;
            };
            let queued = match pool {
                Pool::Default => 0,
                Pool::Recovery(weight) => weight,
            };
            if requeue_if_heavier(state, descriptor, queued) {
                continue;
            }
            match pool {
                Pool::Default => state.stats.default_descriptors += 1,
                Pool::Recovery(_) => state.stats.recovery_descriptors += 1,
            }
            processed += 1;
            step(ctx, state, descriptor);
        }
    }

    finish(ctx, state, None)
}

/// Whether pending work could still produce a cheaper accepted root
fn may_improve<V: Vertex>(state: &mut GllState<V>) -> bool {
    let Some(root) = state.result else {
        return true;
    };
    let best = state.sppf.weight(root);
    state
        .worklist
        .cheapest_pending()
        .is_some_and(|pending| pending < best)
}

/// Put a descriptor back at its current weight when an invalidation made its
/// derivation more expensive than the weight it was queued at
fn requeue_if_heavier<V: Vertex>(
    state: &mut GllState<V>,
    descriptor: Descriptor<V>,
    queued: Weight,
) -> bool {
    let weight = descriptor_weight(state, &descriptor);
    if weight <= queued {
        return false;
    }
    state.worklist.add(descriptor, weight);
    true
}

fn finish<G: InputGraph>(
    ctx: &ParsingContext<'_, G>,
    state: &GllState<G::Vertex>,
    status: Option<ParseStatus>,
) -> ParseStatus {
    let status = status.unwrap_or_else(|| match state.result {
        Some(root) if state.sppf.weight(root) == 0 => ParseStatus::Accepted,
        Some(_) => ParseStatus::Recovered,
        None if ctx.config.recovery.is_enabled() => ParseStatus::RecoveryExhausted,
        None => ParseStatus::Rejected,
    });
    let stats = state.stats();
    event!(
        Level::DEBUG,
        "gll: parse finished, status={status:?}, weight={:?}, default descriptors={}, recovery descriptors={}, gss nodes={}, sppf nodes={}",
        state.result.map(|root| state.sppf.weight(root)),
        stats.default_descriptors,
        stats.recovery_descriptors,
        stats.gss_nodes,
        stats.sppf_nodes
    );
    status
}

/// Process one descriptor
fn step<G: InputGraph>(
    ctx: &ParsingContext<'_, G>,
    state: &mut GllState<G::Vertex>,
    descriptor: Descriptor<G::Vertex>,
) {
    let rsm_state = ctx.rsm.state(descriptor.state);
    let position = descriptor.position;
    state.worklist.mark_handled(descriptor);

    let mut current = descriptor.sppf;
    if rsm_state.is_start() && rsm_state.is_final() {
        let epsilon = state.sppf.epsilon(position);
        current = Some(
            state
                .sppf
                .get_node_p(ctx.rsm, descriptor.state, current, epsilon),
        );
    }

    if let Some(node) = current {
        record_if_accepting(ctx, state, node);
    }

    for edge in ctx.input.edges(position) {
        match &edge.label {
            None => advance(
                ctx,
                state,
                &descriptor,
                current,
                descriptor.state,
                None,
                edge.target,
                0,
            ),
            Some(terminal) => {
                for &target in rsm_state.targets_on(terminal) {
                    advance(
                        ctx,
                        state,
                        &descriptor,
                        current,
                        target,
                        Some(terminal),
                        edge.target,
                        0,
                    );
                }
            }
        }
    }

    for &(nonterminal, target) in rsm_state.nonterminal_edge_list() {
        let callee = create_gss_node(
            ctx,
            state,
            nonterminal,
            target,
            descriptor.gss,
            current,
            position,
        );
        let start = ctx.rsm.start_state_of(nonterminal);
        add_descriptor(ctx, state, Descriptor::new(start, callee, None, position));
    }

    if ctx.config.recovery.is_enabled() {
        let edits = recovery_edges(rsm_state, ctx.input, position);
        if !edits.is_empty() {
            event!(
                Level::TRACE,
                "gll: {} recovery edges at {position:?} in state {:?}",
                edits.len(),
                descriptor.state
            );
        }
        // Edits continue from the partial derivation the descriptor arrived
        // with, not from its epsilon completion
        for edit in &edits {
            match &edit.terminal {
                None => advance(
                    ctx,
                    state,
                    &descriptor,
                    descriptor.sppf,
                    descriptor.state,
                    None,
                    edit.target,
                    edit.weight,
                ),
                Some(terminal) => {
                    for &target in rsm_state.targets_on(terminal) {
                        advance(
                            ctx,
                            state,
                            &descriptor,
                            descriptor.sppf,
                            target,
                            Some(terminal),
                            edit.target,
                            edit.weight,
                        );
                    }
                }
            }
        }
    }

    if rsm_state.is_final()
        && let Some(node) = current
    {
        pop(ctx, state, descriptor.gss, node, position);
    }
}

/// Consume one (possibly synthesized) input edge from `descriptor.position`
/// to `next` and continue in `target`
#[allow(clippy::too_many_arguments)]
fn advance<G: InputGraph>(
    ctx: &ParsingContext<'_, G>,
    state: &mut GllState<G::Vertex>,
    descriptor: &Descriptor<G::Vertex>,
    left: Option<SppfNodeId>,
    target: RsmStateId,
    terminal: Option<&Terminal>,
    next: G::Vertex,
    weight: Weight,
) {
    let leaf = state
        .sppf
        .terminal(terminal.cloned(), descriptor.position, next, weight);
    let node = state.sppf.get_node_p(ctx.rsm, target, left, leaf);
    add_descriptor(
        ctx,
        state,
        Descriptor::new(target, descriptor.gss, Some(node), next),
    );
}

/// Remember `node` as the parse result if it derives the start nonterminal
/// from a start vertex to a final vertex and beats the current best
fn record_if_accepting<G: InputGraph>(
    ctx: &ParsingContext<'_, G>,
    state: &mut GllState<G::Vertex>,
    node: SppfNodeId,
) {
    if !is_accepting(ctx, &state.sppf, node) {
        return;
    }
    let weight = state.sppf.weight(node);
    if state
        .result
        .is_none_or(|best| state.sppf.weight(best) > weight)
    {
        state.result = Some(node);
    }

    if ctx.config.track_reachability {
        let sppf_node = state.sppf.node(node);
        let pair = (sppf_node.left_extent(), sppf_node.right_extent());
        let distance = state.sppf.min_distance(node);
        state
            .reachability
            .entry(pair)
            .and_modify(|known| *known = (*known).min(distance))
            .or_insert(distance);
    }
}

fn is_accepting<G: InputGraph>(
    ctx: &ParsingContext<'_, G>,
    sppf: &Sppf<G::Vertex>,
    node: SppfNodeId,
) -> bool {
    let sppf_node = sppf.node(node);
    matches!(sppf_node.kind(), SppfNodeKind::Symbol { nonterminal } if *nonterminal == ctx.rsm.start_nonterminal())
        && ctx.input.is_start(sppf_node.left_extent())
        && ctx.input.is_final(sppf_node.right_extent())
}

fn add_descriptor<G: InputGraph>(
    ctx: &ParsingContext<'_, G>,
    state: &mut GllState<G::Vertex>,
    descriptor: Descriptor<G::Vertex>,
) {
    // Accepting descriptors are worth another look while nothing is accepted
    if state.result.is_none()
        && descriptor
            .sppf
            .is_some_and(|node| is_accepting(ctx, &state.sppf, node))
    {
        state.worklist.unmark_handled(&descriptor);
    }
    let weight = descriptor_weight(state, &descriptor);
    state.worklist.add(descriptor, weight);
}

/// Cost of the input consumed before the call plus the partial derivation
fn descriptor_weight<V: Vertex>(state: &GllState<V>, descriptor: &Descriptor<V>) -> Weight {
    state
        .gss
        .node(descriptor.gss)
        .min_weight()
        .saturating_add(descriptor.sppf.map_or(0, |node| state.sppf.weight(node)))
}

/// Call `nonterminal` from `caller`, continuing at `continuation` on return
fn create_gss_node<G: InputGraph>(
    ctx: &ParsingContext<'_, G>,
    state: &mut GllState<G::Vertex>,
    nonterminal: NonterminalId,
    continuation: RsmStateId,
    caller: GssNodeId,
    sppf: Option<SppfNodeId>,
    position: G::Vertex,
) -> GssNodeId {
    let weight = state
        .gss
        .node(caller)
        .min_weight()
        .saturating_add(sppf.map_or(0, |node| state.sppf.weight(node)));
    let callee = state.gss.get_or_create(nonterminal, position, weight);

    if state.gss.add_edge(callee, (continuation, sppf), caller) {
        // The callee already returned: continue from its results right away
        for popped in state.gss.popped(callee) {
            let next = state.sppf.node(popped).right_extent();
            let node = state.sppf.get_node_p(ctx.rsm, continuation, sppf, popped);
            add_descriptor(
                ctx,
                state,
                Descriptor::new(continuation, caller, Some(node), next),
            );
        }
    }
    callee
}

/// Return from the call recorded by `gss` with the derivation `node`
fn pop<G: InputGraph>(
    ctx: &ParsingContext<'_, G>,
    state: &mut GllState<G::Vertex>,
    gss: GssNodeId,
    node: SppfNodeId,
    position: G::Vertex,
) {
    state.gss.record_popped(gss, node);
    for ((continuation, left), caller) in state.gss.callers(gss) {
        let combined = state.sppf.get_node_p(ctx.rsm, continuation, left, node);
        add_descriptor(
            ctx,
            state,
            Descriptor::new(continuation, caller, Some(combined), position),
        );
    }
}
