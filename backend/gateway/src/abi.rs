//! Solidity call signatures of the factory and campaign contracts.
//!
//! Only the functions the gateway reads or builds requests for are declared.
//! Generated call types are used for both calldata encoding and return
//! decoding, so raw tuples never leave [`crate::rpc`].

use alloy_sol_types::sol;

sol! {
    /// One entry of the factory's campaign listing.
    #[derive(Debug, PartialEq, Eq)]
    struct CampaignInfo {
        address campaignAddress;
        address owner;
        string name;
        uint256 creationTime;
    }

    /// One funding tier as stored by a campaign.
    #[derive(Debug, PartialEq, Eq)]
    struct Tier {
        string name;
        uint256 amount;
        uint256 backers;
    }

    interface ICrowdfundingFactory {
        function getAllCampaigns() external view returns (CampaignInfo[] memory);
        function getUserCampaigns(address _user) external view returns (CampaignInfo[] memory);
        function createCampaign(
            string memory _name,
            string memory _description,
            uint256 _goal,
            uint256 _durationInDays
        ) external;
    }

    interface ICrowdfunding {
        function getCampaignDetails() external view returns (
            string memory name,
            string memory description,
            uint256 goal,
            uint256 deadline,
            address owner,
            bool paused,
            uint8 state,
            uint256 raised,
            uint256 backers
        );
        function getTiers() external view returns (Tier[] memory);
        function getLatestETHPrice() external view returns (int256);
        function getTotalRaisedUSD() external view returns (uint256);
        function getContractBalance() external view returns (uint256);
        function getTierPriceInWei(uint256 _index) external view returns (uint256);

        function addTier(string memory _name, uint256 _amount) external;
        function removeTier(uint256 _index) external;
        function fund(uint256 _tierIndex) external payable;
        function withdraw() external;
        function refund() external;
        function togglePause() external;
        function extendDeadline(uint256 _daysToAdd) external;
    }

    /// Chainlink price feed, read directly when no campaign is in scope.
    interface AggregatorV3Interface {
        function latestRoundData() external view returns (
            uint80 roundId,
            int256 answer,
            uint256 startedAt,
            uint256 updatedAt,
            uint80 answeredInRound
        );
    }
}
