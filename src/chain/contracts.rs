//! ABI bindings for the two contracts the client calls.

use alloy::sol;

sol! {
    #[sol(rpc)]
    contract IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

sol! {
    /// Source-chain entry point of the cross-chain router. Reverts are its only error channel.
    #[sol(rpc)]
    contract ICrossChainRouter {
        function swapCrossChain(
            address tokenIn,
            address tokenOut,
            uint256 amountIn,
            uint256 amountOutMin,
            uint256 dstChainId,
            uint256 deadline
        ) external payable;
    }
}
